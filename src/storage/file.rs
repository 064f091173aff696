//! File-backed PersistenceStore: one JSON document per cart key
//!
//! Writes go to a sibling temp file which is flushed and then renamed over
//! the target, so a crash mid-write leaves the previous snapshot intact. The
//! directory is synced after the rename so the new entry survives a crash.

use super::codec::{decode_cart, encode_cart};
use crate::core::{Cart, PersistenceStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Stores a cart as `<dir>/<sanitized key>.json`
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    /// Bind `key` inside `dir`, creating the directory if needed
    pub async fn open(dir: impl AsRef<Path>, key: &str) -> Result<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create storage dir {}", dir.display()))?;

        Ok(Self {
            path: dir.join(format!("{}.json", file_stem(key))),
        })
    }

    /// Location of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

/// Flush directory entries (renames) of `dir` to disk
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> Result<()> {
    tokio::fs::File::open(dir)
        .await
        .with_context(|| format!("open dir {}", dir.display()))?
        .sync_all()
        .await
        .with_context(|| format!("sync dir {}", dir.display()))
}

// Directories cannot be opened as files here; the rename is durable on its own
#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

/// Map a cart key onto a portable file name
fn file_stem(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "cart".to_string()
    } else {
        stem
    }
}

#[async_trait]
impl PersistenceStore for FilePersistence {
    async fn load(&self) -> Result<Option<Cart>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "cart snapshot read");
                decode_cart(&bytes).map(Some)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("read cart snapshot {}", self.path.display()))
            }
        }
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        let bytes = encode_cart(cart)?;
        let temp = self.temp_path();

        let mut file = tokio::fs::File::create(&temp)
            .await
            .with_context(|| format!("create {}", temp.display()))?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp, &self.path)
            .await
            .with_context(|| format!("replace cart snapshot {}", self.path.display()))?;
        sync_dir(self.dir()).await?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "cart snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CartEntry, Product, ProductId};

    #[test]
    fn test_file_stem_sanitizes_key() {
        assert_eq!(file_stem("@RocketShoes:cart"), "_RocketShoes_cart");
        assert_eq!(file_stem("cart-1_a"), "cart-1_a");
        assert_eq!(file_stem(""), "cart");
    }

    #[tokio::test]
    async fn test_sync_dir_on_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersistence::open(dir.path(), "cart").await.unwrap();

        assert_eq!(store.dir(), dir.path());
        sync_dir(store.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersistence::open(dir.path(), "cart").await.unwrap();
        let cart = Cart::new()
            .with_entry(CartEntry::new(
                ProductId::new(2),
                Product {
                    title: "Runner".to_string(),
                    price: 149.9,
                    image: String::new(),
                },
            ))
            .unwrap();

        store.save(&cart).await.unwrap();
        store.save(&Cart::new()).await.unwrap();

        assert_eq!(std::fs::read(store.path()).unwrap(), b"[]");
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().await.unwrap(), Some(Cart::new()));
    }

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePersistence::open(dir.path(), "cart:default").await.unwrap();

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FilePersistence::open(&nested, "cart").await.unwrap();

        store.save(&Cart::new()).await.unwrap();

        assert!(store.path().starts_with(&nested));
        assert_eq!(std::fs::read(store.path()).unwrap(), b"[]");
        assert!(!store.temp_path().exists());
    }
}
