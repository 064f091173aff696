//! The mutation engine: validate → apply → persist → publish
//!
//! [`MutationEngine`] is the only writer of a [`CartStore`]. Every request
//! goes through the same pipeline:
//!
//! ```text
//! request ──▶ writer lock ──▶ fetch stock ──▶ compute next cart
//!                                                   │
//!             publish ◀── CartStore::replace ◀── PersistenceStore::save
//! ```
//!
//! The writer lock is held from the stock lookup until the new cart is
//! installed, so two requests never validate against the same base cart.
//! The next cart is saved *before* it is installed: if the save fails, both
//! the in-memory cart and the persisted record keep their previous value.
//!
//! Each request runs on its own task. A caller that stops awaiting only
//! stops waiting for the answer; the mutation itself still completes or
//! fails as a whole.

mod builder;

pub use builder::CartEngineBuilder;

use crate::core::stock::{check_add, check_set, parse_amount};
use crate::core::{
    Cart, CartEntry, CartEnvelope, CartError, CartEvent, CartStore, EventBus, InventoryClient,
    PersistenceStore, Product, ProductCatalog, ProductId, StockSnapshot,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tracing::Instrument;

/// A single cart mutation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Add one unit of a product
    AddItem(ProductId),
    /// Delete a product's entry
    RemoveItem(ProductId),
    /// Set a product's quantity; `amount` is taken as sent by the caller
    SetQuantity { product_id: ProductId, amount: i64 },
}

impl Mutation {
    pub fn product_id(&self) -> ProductId {
        match self {
            Mutation::AddItem(product_id)
            | Mutation::RemoveItem(product_id)
            | Mutation::SetQuantity { product_id, .. } => *product_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddItem(_) => "add_item",
            Mutation::RemoveItem(_) => "remove_item",
            Mutation::SetQuantity { .. } => "set_quantity",
        }
    }
}

struct EngineInner {
    store: CartStore,
    inventory: Arc<dyn InventoryClient>,
    catalog: Arc<dyn ProductCatalog>,
    persistence: Arc<dyn PersistenceStore>,
    events: EventBus,
    lookup_timeout: Option<Duration>,
    writer: Mutex<()>,
}

/// Serialized, stock-validated writer of a cart
///
/// Cheap to clone; clones drive the same cart.
#[derive(Clone)]
pub struct MutationEngine {
    inner: Arc<EngineInner>,
}

impl MutationEngine {
    /// Start building an engine from a configuration
    pub fn builder(config: crate::config::CartConfig) -> CartEngineBuilder {
        CartEngineBuilder::from_config(config)
    }

    /// Add one unit of `product_id`, creating its entry if needed
    pub async fn add_item(&self, product_id: ProductId) -> Result<Cart, CartError> {
        self.apply(Mutation::AddItem(product_id)).await
    }

    /// Delete the entry for `product_id`
    pub async fn remove_item(&self, product_id: ProductId) -> Result<Cart, CartError> {
        self.apply(Mutation::RemoveItem(product_id)).await
    }

    /// Set the quantity of an existing entry
    pub async fn set_quantity(&self, product_id: ProductId, amount: i64) -> Result<Cart, CartError> {
        self.apply(Mutation::SetQuantity { product_id, amount }).await
    }

    /// Run a mutation to completion and return the resulting cart
    pub async fn apply(&self, mutation: Mutation) -> Result<Cart, CartError> {
        let inner = Arc::clone(&self.inner);
        let span = tracing::info_span!(
            "cart_mutation",
            op = mutation.name(),
            product_id = %mutation.product_id()
        );

        tokio::spawn(async move { inner.run(mutation).await }.instrument(span))
            .await
            .map_err(|e| CartError::Internal {
                message: format!("mutation task failed: {e}"),
            })?
    }

    /// Last committed cart; never waits on an in-flight mutation
    pub fn cart(&self) -> Cart {
        self.inner.store.snapshot()
    }

    /// Number of commits since the engine started
    pub fn version(&self) -> u64 {
        self.inner.store.version()
    }

    /// Handle to the underlying store
    ///
    /// Only the engine can replace its cart, so the handle is read-only.
    pub fn store(&self) -> &CartStore {
        &self.inner.store
    }

    /// Receive an envelope for every future commit
    pub fn subscribe(&self) -> broadcast::Receiver<CartEnvelope> {
        self.inner.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }
}

impl EngineInner {
    async fn run(&self, mutation: Mutation) -> Result<Cart, CartError> {
        let _writer = self.writer.lock().await;
        let current = self.store.shared();

        let (next, event) = match self.plan(&current, mutation).await {
            Ok(planned) => planned,
            Err(err) => {
                if err.is_rejection() {
                    tracing::warn!(code = err.error_code(), error = %err, "mutation rejected");
                } else {
                    tracing::error!(code = err.error_code(), error = %err, "mutation aborted");
                }
                return Err(err);
            }
        };

        if let Err(e) = self.persistence.save(&next).await {
            let err = CartError::persistence(format!("{e:#}"));
            tracing::error!(error = %err, "cart snapshot not saved, mutation aborted");
            return Err(err);
        }

        let version = self.store.replace(next.clone());
        tracing::info!(
            version,
            action = event.action(),
            quantity = next.quantity_of(event.product_id()).map_or(0, |q| q.get()),
            entries = next.len(),
            "cart committed"
        );

        self.events
            .publish(CartEnvelope::new(version, event, next.clone()));

        Ok(next)
    }

    /// Validate `mutation` against `current` and compute the next cart
    ///
    /// Performs remote lookups but never writes.
    async fn plan(&self, current: &Cart, mutation: Mutation) -> Result<(Cart, CartEvent), CartError> {
        match mutation {
            Mutation::AddItem(product_id) => {
                let stock = self.stock(product_id).await?;
                let quantity = check_add(&stock, current.quantity_of(product_id))?;

                if current.contains(product_id) {
                    let next = current
                        .with_quantity(product_id, quantity)
                        .ok_or(CartError::ProductNotFound { product_id })?;
                    let event = CartEvent::QuantityChanged {
                        product_id,
                        quantity: quantity.get(),
                    };
                    return Ok((next, event));
                }

                let product = self.product(product_id).await?;
                let next = current
                    .with_entry(CartEntry::new(product_id, product))
                    .map_err(|e| CartError::Internal {
                        message: e.to_string(),
                    })?;
                Ok((next, CartEvent::ItemAdded { product_id }))
            }

            Mutation::RemoveItem(product_id) => current
                .without(product_id)
                .map(|next| (next, CartEvent::ItemRemoved { product_id }))
                .ok_or(CartError::ProductNotFound { product_id }),

            Mutation::SetQuantity { product_id, amount } => {
                let amount = parse_amount(product_id, amount)?;
                let stock = self.stock(product_id).await?;
                let quantity = check_set(&stock, amount)?;

                let next = current
                    .with_quantity(product_id, quantity)
                    .ok_or(CartError::ProductNotFound { product_id })?;
                let event = CartEvent::QuantityChanged {
                    product_id,
                    quantity: quantity.get(),
                };
                Ok((next, event))
            }
        }
    }

    async fn stock(&self, product_id: ProductId) -> Result<StockSnapshot, CartError> {
        let snapshot = self
            .bounded(self.inventory.get_stock(product_id))
            .await
            .map_err(|e| CartError::inventory(product_id, e))?;

        if snapshot.product_id != product_id {
            return Err(CartError::inventory(
                product_id,
                format!("stock reported for product {}", snapshot.product_id),
            ));
        }

        tracing::debug!(available = snapshot.available_quantity, "stock fetched");
        Ok(snapshot)
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, CartError> {
        let product = self
            .bounded(self.catalog.get_product(product_id))
            .await
            .map_err(|e| CartError::catalog(product_id, e))?;

        // JSON has no NaN or infinity; such a price could not be persisted
        if !product.price.is_finite() {
            return Err(CartError::catalog(
                product_id,
                format!("price {} is not a finite number", product.price),
            ));
        }
        Ok(product)
    }

    /// Await a collaborator call, giving up after the configured timeout
    async fn bounded<T>(
        &self,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, String> {
        let result = match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| format!("no answer within {} ms", limit.as_millis()))?,
            None => call.await,
        };
        result.map_err(|e| format!("{e:#}"))
    }
}
