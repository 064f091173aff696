//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default key under which the cart snapshot is persisted
pub const DEFAULT_CART_KEY: &str = "cart:default";

/// Where cart snapshots are persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process memory only; lost on restart
    #[default]
    Memory,
    /// One JSON file per cart key inside `path`
    File { path: PathBuf },
    /// LMDB environment at `path` (requires the `lmdb` feature)
    Lmdb { path: PathBuf },
}

/// Remote inventory service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Base URL of the stock/products API
    pub base_url: String,
}

/// Complete configuration for a cart engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Fixed key of the persisted cart record
    pub cart_key: String,

    /// Buffer size of the commit broadcast channel
    pub event_capacity: usize,

    /// Upper bound on a single inventory or catalog call, in milliseconds
    ///
    /// Defaults to 5000 when the key is absent. An explicit `null` waits
    /// indefinitely.
    pub inventory_timeout_ms: Option<u64>,

    pub storage: StorageConfig,

    /// Remote inventory (requires the `http` feature)
    pub inventory: Option<InventoryConfig>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            cart_key: DEFAULT_CART_KEY.to_string(),
            event_capacity: 1024,
            inventory_timeout_ms: Some(5_000),
            storage: StorageConfig::default(),
            inventory: None,
        }
    }
}

impl CartConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Inventory call timeout, if any
    pub fn inventory_timeout(&self) -> Option<Duration> {
        self.inventory_timeout_ms.map(Duration::from_millis)
    }
}
