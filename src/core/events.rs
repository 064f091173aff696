//! Commit notifications for cart subscribers
//!
//! The EventBus uses `tokio::sync::broadcast` to decouple the mutation
//! engine from whatever displays the cart. Every successful commit publishes
//! one [`CartEnvelope`] carrying the full resulting cart.
//!
//! # Architecture
//!
//! ```text
//! add_item ──────┐
//! remove_item ───┼──▶ EventBus::publish() ──▶ broadcast channel ──▶ display subscribers
//! set_quantity ──┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut rx = engine.subscribe();
//!
//! engine.add_item(ProductId::new(7)).await?;
//!
//! if let Ok(envelope) = rx.recv().await {
//!     render(&envelope.cart);
//! }
//! ```

use super::cart::{Cart, ProductId};
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

/// What a committed mutation did to the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CartEvent {
    /// A new entry was appended with quantity 1
    ItemAdded { product_id: ProductId },
    /// An existing entry's quantity changed
    QuantityChanged { product_id: ProductId, quantity: u32 },
    /// An entry was deleted
    ItemRemoved { product_id: ProductId },
}

impl CartEvent {
    pub fn product_id(&self) -> ProductId {
        match self {
            CartEvent::ItemAdded { product_id }
            | CartEvent::QuantityChanged { product_id, .. }
            | CartEvent::ItemRemoved { product_id } => *product_id,
        }
    }

    /// Get the action name (item_added, quantity_changed, item_removed)
    pub fn action(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded { .. } => "item_added",
            CartEvent::QuantityChanged { .. } => "quantity_changed",
            CartEvent::ItemRemoved { .. } => "item_removed",
        }
    }
}

/// Envelope wrapping a cart event with the committed cart and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the commit happened
    pub timestamp: DateTime<Utc>,
    /// Store version produced by the commit
    pub version: u64,
    /// The mutation that was applied
    pub event: CartEvent,
    /// Full cart after the commit
    pub cart: Cart,
}

impl CartEnvelope {
    pub fn new(version: u64, event: CartEvent, cart: Cart) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            version,
            event,
            cart,
        }
    }
}

/// Broadcast-based event bus for committed carts
///
/// The bus is cheap to clone (Arc internally) and can be shared across threads.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CartEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many envelopes can be buffered before
    /// slow receivers start losing them (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an envelope to all subscribers
    ///
    /// Never fails. If there are no subscribers the envelope is dropped.
    /// Returns the number of receivers that will receive it.
    pub fn publish(&self, envelope: CartEnvelope) -> usize {
        // send() returns Err only if there are no receivers, which is fine
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to envelopes published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<CartEnvelope> {
        self.sender.subscribe()
    }

    /// Subscribe as a stream, silently skipping over lag gaps
    ///
    /// A lagging consumer only needs the newest cart, so missed envelopes
    /// are dropped rather than surfaced.
    pub fn stream(&self) -> impl Stream<Item = CartEnvelope> + Send + 'static {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|item| async move {
            match item {
                Ok(envelope) => Some(envelope),
                Err(err) => {
                    tracing::warn!(error = %err, "cart subscriber lagged");
                    None
                }
            }
        })
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
