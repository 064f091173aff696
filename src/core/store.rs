//! Authoritative in-memory cart state

use super::cart::Cart;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
struct Committed {
    version: u64,
    cart: Arc<Cart>,
}

/// Holds the committed cart and swaps it atomically
///
/// A pure state container: no validation, persistence or notification
/// happens here. Readers observe either the old or the new cart, never an
/// intermediate, and the lock is never held across an await.
///
/// Outside this crate a store can only be read; swapping the cart is left
/// to the engine, which saves it first.
///
/// ```compile_fail
/// use cart::prelude::*;
///
/// CartStore::new().replace(Cart::new());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    state: Arc<RwLock<Committed>>,
}

impl CartStore {
    /// Create a store holding an empty cart at version 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a restored cart at version 0
    pub fn with_cart(cart: Cart) -> Self {
        Self {
            state: Arc::new(RwLock::new(Committed {
                version: 0,
                cart: Arc::new(cart),
            })),
        }
    }

    /// Current committed cart
    pub fn snapshot(&self) -> Cart {
        self.shared().as_ref().clone()
    }

    /// Current committed cart without cloning its entries
    pub fn shared(&self) -> Arc<Cart> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.cart)
    }

    /// Number of replacements since the store was created
    pub fn version(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Swap in a new cart, returning the new version
    pub(crate) fn replace(&self, cart: Cart) -> u64 {
        let cart = Arc::new(cart);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.version += 1;
        state.cart = cart;
        state.version
    }
}
