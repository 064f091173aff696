//! HTTP inventory and catalog client
//!
//! Talks to the storefront's JSON API:
//!
//! - `GET {base_url}/stock/{id}` → `{ "id": 7, "amount": 5 }`
//! - `GET {base_url}/products/{id}` → `{ "id": 7, "title": "...", "price": 179.9, "image": "..." }`
//!
//! Any transport error or non-2xx status is returned as an error; the
//! engine turns it into `InventoryUnreachable` or `CatalogUnreachable`.
//!
//! # Feature flag
//!
//! Enable with `--features http`. Requires the `reqwest` crate.

use crate::core::{InventoryClient, Product, ProductCatalog, ProductId, StockSnapshot};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StockBody {
    id: ProductId,
    amount: u32,
}

#[derive(Debug, Deserialize)]
struct ProductBody {
    id: ProductId,
    #[serde(flatten)]
    product: Product,
}

/// Client for the storefront's stock and product endpoints
#[derive(Debug, Clone)]
pub struct HttpInventory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInventory {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:3333`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, resource: &str, product_id: ProductId) -> String {
        format!("{}/{}/{}", self.base_url, resource, product_id)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T> {
        tracing::debug!(url = %url, "inventory request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("decode response from {url}"))
    }
}

#[async_trait]
impl InventoryClient for HttpInventory {
    async fn get_stock(&self, product_id: ProductId) -> Result<StockSnapshot> {
        let body: StockBody = self.fetch(self.url("stock", product_id)).await?;
        if body.id != product_id {
            bail!("stock response for product {} while asking for {}", body.id, product_id);
        }
        Ok(StockSnapshot::new(product_id, body.amount))
    }
}

#[async_trait]
impl ProductCatalog for HttpInventory {
    async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        let body: ProductBody = self.fetch(self.url("products", product_id)).await?;
        if body.id != product_id {
            bail!("product response for {} while asking for {}", body.id, product_id);
        }
        Ok(body.product)
    }
}
