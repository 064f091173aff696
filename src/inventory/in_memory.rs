//! In-memory stock and product tables for testing and development

use crate::core::{InventoryClient, Product, ProductCatalog, ProductId, StockSnapshot};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Tables {
    stock: HashMap<ProductId, u32>,
    products: HashMap<ProductId, Product>,
}

/// In-memory inventory implementing both [`InventoryClient`] and
/// [`ProductCatalog`]
///
/// Clones share the same tables, so a test can keep a handle and change
/// stock levels between mutations. Unknown products report an error, the
/// same way a remote service answering 404 would.
#[derive(Clone, Default)]
pub struct InMemoryInventory {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product with its display data and stock level
    pub fn with_product(self, product_id: ProductId, product: Product, stock: u32) -> Self {
        self.insert(product_id, product, stock);
        self
    }

    /// Register or replace a product
    pub fn insert(&self, product_id: ProductId, product: Product, stock: u32) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.products.insert(product_id, product);
        tables.stock.insert(product_id, stock);
    }

    /// Change the stock level reported for a product
    pub fn set_stock(&self, product_id: ProductId, stock: u32) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.stock.insert(product_id, stock);
    }
}

#[async_trait]
impl InventoryClient for InMemoryInventory {
    async fn get_stock(&self, product_id: ProductId) -> Result<StockSnapshot> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        tables
            .stock
            .get(&product_id)
            .map(|available| StockSnapshot::new(product_id, *available))
            .ok_or_else(|| anyhow!("no stock record for product {}", product_id))
    }
}

#[async_trait]
impl ProductCatalog for InMemoryInventory {
    async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        tables
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| anyhow!("product {} not found", product_id))
    }
}
