//! JSON encoding shared by every persistence backend
//!
//! All backends store the same bytes, so a cart moved between backends
//! (or written by the storefront's browser storage) decodes identically.

use crate::core::Cart;
use anyhow::{Context, Result, bail};

/// Encode a cart as JSON bytes.
///
/// Fails on a non-finite price, which JSON can only write as `null`.
pub fn encode_cart(cart: &Cart) -> Result<Vec<u8>> {
    if let Some(entry) = cart.entries().iter().find(|e| !e.product.price.is_finite()) {
        bail!(
            "cart encode: product {} has non-finite price {}",
            entry.product_id,
            entry.product.price
        );
    }
    serde_json::to_vec(cart).context("cart encode")
}

/// Decode a cart from JSON bytes.
///
/// Rejects payloads that would break cart invariants (zero quantities,
/// duplicate products).
pub fn decode_cart(bytes: &[u8]) -> Result<Cart> {
    serde_json::from_slice(bytes).context("cart decode")
}
