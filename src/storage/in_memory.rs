//! In-memory implementation of PersistenceStore for testing and development

use super::codec::{decode_cart, encode_cart};
use crate::core::{Cart, PersistenceStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory persistence keyed by cart key
///
/// Stores the encoded JSON bytes rather than the `Cart` value so tests can
/// compare exactly what a durable backend would hold. Clones share the same
/// underlying map, which lets a test "restart" an engine against the
/// records a previous instance wrote.
#[derive(Clone)]
pub struct InMemoryPersistence {
    key: String,
    records: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryPersistence {
    /// Create an empty store bound to `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Bind another cart key to the same underlying records
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            records: Arc::clone(&self.records),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw bytes currently stored under this store's key
    pub fn raw(&self) -> Result<Option<Vec<u8>>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.get(&self.key).cloned())
    }

    /// Overwrite the raw bytes under this store's key
    pub fn put_raw(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.insert(self.key.clone(), bytes.into());

        Ok(())
    }
}

#[async_trait]
impl PersistenceStore for InMemoryPersistence {
    async fn load(&self) -> Result<Option<Cart>> {
        self.raw()?.map(|bytes| decode_cart(&bytes)).transpose()
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let bytes = encode_cart(cart)?;
        self.put_raw(bytes)
    }
}
