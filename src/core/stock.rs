//! Stock snapshots and the quantity rules checked against them
//!
//! Rules are pure functions over a freshly fetched [`StockSnapshot`] so the
//! engine can validate a request before touching any state.

use super::cart::ProductId;
use super::error::CartError;
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU32, NonZeroU64};

/// Availability of a product as reported by the inventory service
///
/// Advisory input to validation only; never persisted with the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub product_id: ProductId,
    pub available_quantity: u32,
}

impl StockSnapshot {
    pub fn new(product_id: ProductId, available_quantity: u32) -> Self {
        Self {
            product_id,
            available_quantity,
        }
    }
}

/// Check that one more unit may be added on top of `current`
///
/// Returns the quantity the entry will hold after the add. A product needs
/// more than one unit in stock before any unit can be added, and an
/// existing entry of `N` units needs more than `N` in stock to grow.
pub fn check_add(
    stock: &StockSnapshot,
    current: Option<NonZeroU32>,
) -> Result<NonZeroU32, CartError> {
    let available = stock.available_quantity;
    let held = current.map_or(0, NonZeroU32::get);

    let unavailable = || CartError::StockUnavailable {
        product_id: stock.product_id,
        requested: held.saturating_add(1),
        available,
    };

    if available <= 1 || available <= held {
        return Err(unavailable());
    }

    // available > held, so held + 1 cannot overflow
    NonZeroU32::new(held + 1).ok_or_else(unavailable)
}

/// Validate the raw amount of a set-quantity request
///
/// Runs before any stock lookup: amounts below 1 are rejected outright.
/// Larger amounts are left to [`check_set`], however large.
pub fn parse_amount(product_id: ProductId, amount: i64) -> Result<NonZeroU64, CartError> {
    u64::try_from(amount)
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or(CartError::InvalidQuantity { product_id, amount })
}

/// Check that `amount` units are covered by the snapshot
///
/// Returns the quantity to store. Stock is a `u32`, so any amount it covers
/// fits one.
pub fn check_set(stock: &StockSnapshot, amount: NonZeroU64) -> Result<NonZeroU32, CartError> {
    let available = stock.available_quantity;

    if amount.get() > u64::from(available) {
        return Err(CartError::StockUnavailable {
            product_id: stock.product_id,
            requested: u32::try_from(amount.get()).unwrap_or(u32::MAX),
            available,
        });
    }

    NonZeroU32::try_from(amount).map_err(|_| CartError::StockUnavailable {
        product_id: stock.product_id,
        requested: u32::MAX,
        available,
    })
}
