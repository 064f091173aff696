//! Shared test harness for engine testing
//!
//! Provides a scriptable inventory (stock levels, outages, latency, call
//! counting) and a persistence wrapper whose saves can be made to fail.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod support;
//! use support::*;
//! ```

#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cart::prelude::*;

pub const CART_KEY: &str = "cart:test";

/// Display data for a test product
pub fn product(id: i64) -> Product {
    Product {
        title: format!("Sneaker #{id}"),
        price: 99.9 + id as f64,
        image: format!("https://cdn.example.com/sneakers/{id}.jpg"),
    }
}

pub fn pid(id: i64) -> ProductId {
    ProductId::new(id)
}

pub fn quantity(cart: &Cart, id: i64) -> Option<u32> {
    cart.quantity_of(pid(id)).map(|q| q.get())
}

pub fn ids(cart: &Cart) -> Vec<i64> {
    cart.entries().iter().map(|e| e.product_id.get()).collect()
}

// ---------------------------------------------------------------------------
// ScriptedInventory
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Script {
    stock: Mutex<HashMap<ProductId, u32>>,
    prices: Mutex<HashMap<ProductId, f64>>,
    inventory_down: AtomicBool,
    catalog_down: AtomicBool,
    latency: Mutex<Option<Duration>>,
    stock_calls: AtomicUsize,
    product_calls: AtomicUsize,
}

/// Inventory + catalog whose behaviour tests change on the fly
///
/// Clones share the same script.
#[derive(Clone, Default)]
pub struct ScriptedInventory {
    script: Arc<Script>,
}

impl ScriptedInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock(self, id: i64, available: u32) -> Self {
        self.set_stock(id, available);
        self
    }

    pub fn set_stock(&self, id: i64, available: u32) {
        self.script.stock.lock().unwrap().insert(pid(id), available);
    }

    pub fn stock_of(&self, id: i64) -> u32 {
        self.script
            .stock
            .lock()
            .unwrap()
            .get(&pid(id))
            .copied()
            .unwrap_or(0)
    }

    /// Override the catalog price of a product
    pub fn set_price(&self, id: i64, price: f64) {
        self.script.prices.lock().unwrap().insert(pid(id), price);
    }

    pub fn set_inventory_down(&self, down: bool) {
        self.script.inventory_down.store(down, Ordering::SeqCst);
    }

    pub fn set_catalog_down(&self, down: bool) {
        self.script.catalog_down.store(down, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.script.latency.lock().unwrap() = latency;
    }

    pub fn stock_calls(&self) -> usize {
        self.script.stock_calls.load(Ordering::SeqCst)
    }

    pub fn product_calls(&self) -> usize {
        self.script.product_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        let latency = *self.script.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl InventoryClient for ScriptedInventory {
    async fn get_stock(&self, product_id: ProductId) -> Result<StockSnapshot> {
        self.script.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        if self.script.inventory_down.load(Ordering::SeqCst) {
            bail!("503 Service Unavailable");
        }
        Ok(StockSnapshot::new(product_id, self.stock_of(product_id.get())))
    }
}

#[async_trait]
impl ProductCatalog for ScriptedInventory {
    async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        self.script.product_calls.fetch_add(1, Ordering::SeqCst);
        if self.script.catalog_down.load(Ordering::SeqCst) {
            bail!("connection reset by peer");
        }
        let mut product = product(product_id.get());
        if let Some(price) = self.script.prices.lock().unwrap().get(&product_id) {
            product.price = *price;
        }
        Ok(product)
    }
}

// ---------------------------------------------------------------------------
// FlakyPersistence
// ---------------------------------------------------------------------------

/// In-memory persistence whose saves can be switched to fail
#[derive(Clone)]
pub struct FlakyPersistence {
    inner: InMemoryPersistence,
    failing: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl FlakyPersistence {
    pub fn new() -> Self {
        Self {
            inner: InMemoryPersistence::new(CART_KEY),
            failing: Arc::new(AtomicBool::new(false)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw bytes of the persisted record
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.inner.raw().unwrap()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn backing(&self) -> InMemoryPersistence {
        self.inner.clone()
    }
}

#[async_trait]
impl PersistenceStore for FlakyPersistence {
    async fn load(&self) -> Result<Option<Cart>> {
        self.inner.load().await
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("No space left on device");
        }
        self.inner.save(cart).await?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine factories
// ---------------------------------------------------------------------------

/// Build an engine with no inventory timeout
pub async fn engine_with(
    inventory: &ScriptedInventory,
    persistence: &FlakyPersistence,
) -> MutationEngine {
    let config = CartConfig {
        cart_key: CART_KEY.to_string(),
        inventory_timeout_ms: None,
        ..CartConfig::default()
    };
    engine_with_config(config, inventory, persistence).await
}

pub async fn engine_with_config(
    config: CartConfig,
    inventory: &ScriptedInventory,
    persistence: &FlakyPersistence,
) -> MutationEngine {
    CartEngineBuilder::from_config(config)
        .with_inventory_and_catalog(inventory.clone())
        .with_persistence(persistence.clone())
        .build()
        .await
        .expect("engine should build")
}
