//! CartEngineBuilder for assembling an engine from config and collaborators

use super::{EngineInner, MutationEngine};
use crate::config::{CartConfig, StorageConfig};
use crate::core::{CartStore, EventBus, InventoryClient, PersistenceStore, ProductCatalog};
use crate::storage::{FilePersistence, InMemoryPersistence};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Builder for creating a [`MutationEngine`]
///
/// Collaborators passed explicitly win over the ones the configuration
/// describes. Unless a store is injected with [`with_store`](Self::with_store),
/// `build` restores the cart from persistence.
///
/// # Example
///
/// ```ignore
/// let inventory = InMemoryInventory::new();
///
/// let engine = CartEngineBuilder::new()
///     .with_inventory_and_catalog(inventory)
///     .with_persistence(InMemoryPersistence::new("cart:default"))
///     .build()
///     .await?;
/// ```
pub struct CartEngineBuilder {
    config: CartConfig,
    store: Option<CartStore>,
    inventory: Option<Arc<dyn InventoryClient>>,
    catalog: Option<Arc<dyn ProductCatalog>>,
    persistence: Option<Arc<dyn PersistenceStore>>,
    event_bus: Option<EventBus>,
}

impl CartEngineBuilder {
    /// Create a builder with the default configuration
    pub fn new() -> Self {
        Self::from_config(CartConfig::default())
    }

    /// Create a builder from a loaded configuration
    pub fn from_config(config: CartConfig) -> Self {
        Self {
            config,
            store: None,
            inventory: None,
            catalog: None,
            persistence: None,
            event_bus: None,
        }
    }

    /// Set the stock source
    pub fn with_inventory(mut self, inventory: impl InventoryClient + 'static) -> Self {
        self.inventory = Some(Arc::new(inventory));
        self
    }

    /// Set the product lookup used when a new entry is created
    pub fn with_catalog(mut self, catalog: impl ProductCatalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Use one service for both stock and product lookups
    pub fn with_inventory_and_catalog<S>(mut self, service: S) -> Self
    where
        S: InventoryClient + ProductCatalog + 'static,
    {
        let service = Arc::new(service);
        self.inventory = Some(service.clone());
        self.catalog = Some(service);
        self
    }

    /// Set the persistence backend, overriding `storage` from the config
    pub fn with_persistence(mut self, persistence: impl PersistenceStore + 'static) -> Self {
        self.persistence = Some(Arc::new(persistence));
        self
    }

    /// Drive an existing store instead of restoring one from persistence
    pub fn with_store(mut self, store: CartStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Publish commits on an existing bus instead of a fresh one
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Resolve collaborators, restore the cart and build the engine
    pub async fn build(self) -> Result<MutationEngine> {
        let config = self.config;

        let (inventory, catalog) = match (self.inventory, self.catalog) {
            (Some(inventory), Some(catalog)) => (inventory, catalog),
            (inventory, catalog) => {
                let (remote_inventory, remote_catalog) = remote_inventory(&config)?;
                (
                    inventory.unwrap_or(remote_inventory),
                    catalog.unwrap_or(remote_catalog),
                )
            }
        };

        let persistence = match self.persistence {
            Some(persistence) => persistence,
            None => open_storage(&config).await?,
        };

        let store = match self.store {
            Some(store) => store,
            None => {
                let cart = persistence
                    .load()
                    .await
                    .context("restore cart from persistence")?
                    .unwrap_or_default();
                tracing::info!(
                    key = %config.cart_key,
                    entries = cart.len(),
                    "cart restored"
                );
                CartStore::with_cart(cart)
            }
        };

        let events = self
            .event_bus
            .unwrap_or_else(|| EventBus::new(config.event_capacity));

        Ok(MutationEngine {
            inner: Arc::new(EngineInner {
                store,
                inventory,
                catalog,
                persistence,
                events,
                lookup_timeout: config.inventory_timeout(),
                writer: Mutex::new(()),
            }),
        })
    }
}

impl Default for CartEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

type RemoteServices = (Arc<dyn InventoryClient>, Arc<dyn ProductCatalog>);

#[cfg(feature = "http")]
fn remote_inventory(config: &CartConfig) -> Result<RemoteServices> {
    let Some(remote) = &config.inventory else {
        bail!("no inventory client configured: pass one to the builder or set `inventory.base_url`");
    };
    let client = Arc::new(crate::inventory::HttpInventory::new(remote.base_url.clone()));
    Ok((client.clone(), client))
}

#[cfg(not(feature = "http"))]
fn remote_inventory(config: &CartConfig) -> Result<RemoteServices> {
    if config.inventory.is_some() {
        bail!("`inventory.base_url` requires the `http` feature");
    }
    bail!("no inventory client configured: pass one to the builder")
}

async fn open_storage(config: &CartConfig) -> Result<Arc<dyn PersistenceStore>> {
    let key = config.cart_key.as_str();

    let store: Arc<dyn PersistenceStore> = match &config.storage {
        StorageConfig::Memory => Arc::new(InMemoryPersistence::new(key)),
        StorageConfig::File { path } => Arc::new(FilePersistence::open(path, key).await?),
        #[cfg(feature = "lmdb")]
        StorageConfig::Lmdb { path } => {
            Arc::new(crate::storage::LmdbPersistence::open(path, key)?)
        }
        #[cfg(not(feature = "lmdb"))]
        StorageConfig::Lmdb { .. } => bail!("the lmdb storage backend requires the `lmdb` feature"),
    };

    tracing::debug!(storage = ?config.storage, key, "persistence opened");
    Ok(store)
}
