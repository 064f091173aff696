//! LMDB persistence backend using heed (memory-mapped B-tree).
//!
//! LMDB is an embedded key-value store with no external server. All
//! operations are synchronous (memory-mapped I/O) and are wrapped in
//! `tokio::task::spawn_blocking` for async compatibility.
//!
//! # Databases (named LMDB sub-databases)
//!
//! - `carts`: cart key → JSON-encoded cart
//!
//! A write transaction either commits the whole snapshot or nothing, so a
//! failed save never exposes a partial cart to the next load.
//!
//! # Feature flag
//!
//! Enable with `--features lmdb`. Requires the `heed` crate.

use super::codec::{decode_cart, encode_cart};
use crate::core::{Cart, PersistenceStore};
use anyhow::Result;
use async_trait::async_trait;
use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use std::path::Path;
use std::sync::Arc;

/// LMDB-backed implementation of `PersistenceStore`.
///
/// The `Env` is wrapped in an `Arc` for cheap cloning across async tasks;
/// clones bound to other keys via [`with_key`](Self::with_key) share it.
///
/// # Example
///
/// ```rust,ignore
/// use cart::storage::LmdbPersistence;
///
/// let store = LmdbPersistence::open("/var/lib/cart", "cart:default")?;
/// store.save(&cart).await?;
/// ```
#[derive(Clone)]
pub struct LmdbPersistence {
    env: Arc<Env>,
    db: Database<Str, Bytes>,
    key: String,
}

impl LmdbPersistence {
    /// Open (or create) an LMDB environment at `path` and initialise the
    /// `carts` named database.
    ///
    /// The map size is 64 MB of virtual address space; carts are tiny.
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> Result<Self> {
        std::fs::create_dir_all(path.as_ref())?;

        // SAFETY: the environment is opened once per path by this process and
        // never concurrently opened with different flags.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(64 * 1024 * 1024)
                .max_dbs(4)
                .open(path.as_ref())?
        };

        let mut wtxn = env.write_txn()?;
        let db: Database<Str, Bytes> = env.create_database(&mut wtxn, Some("carts"))?;
        wtxn.commit()?;

        Ok(Self {
            env: Arc::new(env),
            db,
            key: key.into(),
        })
    }

    /// Bind another cart key to the same environment
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self {
            env: Arc::clone(&self.env),
            db: self.db,
            key: key.into(),
        }
    }
}

#[async_trait]
impl PersistenceStore for LmdbPersistence {
    async fn load(&self) -> Result<Option<Cart>> {
        let env = self.env.clone();
        let db = self.db;
        let key = self.key.clone();

        tokio::task::spawn_blocking(move || {
            let rtxn = env.read_txn()?;
            match db.get(&rtxn, &key)? {
                Some(bytes) => Ok(Some(decode_cart(bytes)?)),
                None => Ok(None),
            }
        })
        .await?
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let env = self.env.clone();
        let db = self.db;
        let key = self.key.clone();
        let bytes = encode_cart(cart)?;

        tokio::task::spawn_blocking(move || {
            let mut wtxn = env.write_txn()?;
            db.put(&mut wtxn, &key, &bytes)?;
            wtxn.commit()?;
            tracing::debug!(key = %key, bytes = bytes.len(), "cart snapshot committed to lmdb");
            Ok(())
        })
        .await?
    }
}
