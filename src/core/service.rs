//! Collaborator traits consumed by the mutation engine
//!
//! Implementations report failures as plain `anyhow` errors; the engine
//! decides which [`CartError`](super::CartError) kind a failure maps to
//! based on which collaborator raised it.

use super::cart::{Cart, Product, ProductId};
use super::stock::StockSnapshot;
use anyhow::Result;
use async_trait::async_trait;

/// Source of truth for product availability
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Fetch the current stock level for a product
    async fn get_stock(&self, product_id: ProductId) -> Result<StockSnapshot>;
}

/// Lookup of product display data for new cart entries
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch the display snapshot of a product
    async fn get_product(&self, product_id: ProductId) -> Result<Product>;
}

/// Durable snapshot of a single cart under a fixed key
///
/// `save` must be all-or-nothing: after an error, a subsequent `load`
/// returns the previously saved cart.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Load the stored cart, or `None` if nothing was saved yet
    async fn load(&self) -> Result<Option<Cart>>;

    /// Replace the stored cart
    async fn save(&self, cart: &Cart) -> Result<()>;
}
