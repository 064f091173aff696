//! Cart data model: products, entries and the ordered cart itself
//!
//! A [`Cart`] is an ordered list of [`CartEntry`] values, unique by
//! [`ProductId`]. Quantities are `NonZeroU32`, so an entry with quantity 0
//! cannot exist; removing a product deletes its entry.
//!
//! # Persisted layout
//!
//! Entries serialize to the flat object layout used by the storefront's
//! browser storage, so carts written there load unchanged:
//!
//! ```json
//! [{ "id": 7, "title": "Runner", "price": 139.9, "image": "https://...", "amount": 2 }]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Identifier of a product in the inventory and catalog services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Immutable display snapshot of a product, captured when it enters the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
}

/// A single product line in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(rename = "id")]
    pub product_id: ProductId,

    #[serde(flatten)]
    pub product: Product,

    #[serde(rename = "amount")]
    pub quantity: NonZeroU32,
}

impl CartEntry {
    /// Create an entry holding a single unit
    pub fn new(product_id: ProductId, product: Product) -> Self {
        Self {
            product_id,
            product,
            quantity: NonZeroU32::MIN,
        }
    }
}

/// Raised when a list of entries would produce an invalid cart
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate cart entry for product {0}")]
pub struct DuplicateEntry(pub ProductId);

/// Ordered collection of cart entries, unique by product id
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartEntry>", into = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from entries, rejecting duplicate product ids
    pub fn from_entries(entries: Vec<CartEntry>) -> Result<Self, DuplicateEntry> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.product_id == entry.product_id) {
                return Err(DuplicateEntry(entry.product_id));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry for a product
    pub fn get(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product_id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Current quantity of a product, if present
    pub fn quantity_of(&self, product_id: ProductId) -> Option<NonZeroU32> {
        self.get(product_id).map(|e| e.quantity)
    }

    /// Sum of all entry quantities
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity.get())).sum()
    }

    /// Return a copy with the entry appended at the end
    ///
    /// Returns `Err` if the product is already in the cart.
    pub fn with_entry(&self, entry: CartEntry) -> Result<Self, DuplicateEntry> {
        if self.contains(entry.product_id) {
            return Err(DuplicateEntry(entry.product_id));
        }
        let mut entries = self.entries.clone();
        entries.push(entry);
        Ok(Self { entries })
    }

    /// Return a copy with the product's quantity replaced in place
    ///
    /// Returns `None` if the product is not in the cart.
    pub fn with_quantity(&self, product_id: ProductId, quantity: NonZeroU32) -> Option<Self> {
        let position = self.position(product_id)?;
        let mut entries = self.entries.clone();
        entries[position].quantity = quantity;
        Some(Self { entries })
    }

    /// Return a copy without the product's entry
    ///
    /// Returns `None` if the product is not in the cart.
    pub fn without(&self, product_id: ProductId) -> Option<Self> {
        let position = self.position(product_id)?;
        let mut entries = self.entries.clone();
        entries.remove(position);
        Some(Self { entries })
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.entries.iter().position(|e| e.product_id == product_id)
    }
}

impl TryFrom<Vec<CartEntry>> for Cart {
    type Error = DuplicateEntry;

    fn try_from(entries: Vec<CartEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<Cart> for Vec<CartEntry> {
    fn from(cart: Cart) -> Self {
        cart.entries
    }
}
