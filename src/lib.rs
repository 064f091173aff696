//! # cart-rs
//!
//! A stock-validated shopping cart engine that survives restarts.
//!
//! ## Features
//!
//! - **Serialized Mutations**: add, remove and set-quantity never interleave
//! - **Fresh Stock Checks**: every request is validated against the inventory service
//! - **All-or-Nothing Commits**: a failed check or save leaves memory and disk untouched
//! - **Durable Snapshots**: in-memory, file and LMDB backends behind one trait
//! - **Commit Notifications**: every committed cart is broadcast to subscribers
//! - **Typed Errors**: each failure kind is reported distinctly
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cart::prelude::*;
//!
//! let inventory = InMemoryInventory::new().with_product(
//!     ProductId::new(7),
//!     Product { title: "Runner".into(), price: 179.9, image: String::new() },
//!     5,
//! );
//!
//! let engine = CartEngineBuilder::new()
//!     .with_inventory_and_catalog(inventory)
//!     .build()
//!     .await?;
//!
//! let cart = engine.add_item(ProductId::new(7)).await?;
//! assert_eq!(cart.quantity_of(ProductId::new(7)).map(|q| q.get()), Some(1));
//!
//! match engine.set_quantity(ProductId::new(7), 0).await {
//!     Err(CartError::InvalidQuantity { .. }) => {}
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod inventory;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Model ===
    pub use crate::core::{
        cart::{Cart, CartEntry, Product, ProductId},
        error::{CartError, ErrorResponse},
        events::{CartEnvelope, CartEvent, EventBus},
        stock::StockSnapshot,
        store::CartStore,
    };

    // === Collaborator Traits ===
    pub use crate::core::service::{InventoryClient, PersistenceStore, ProductCatalog};

    // === Engine ===
    pub use crate::engine::{CartEngineBuilder, Mutation, MutationEngine};

    // === Backends ===
    #[cfg(feature = "http")]
    pub use crate::inventory::HttpInventory;
    pub use crate::inventory::InMemoryInventory;
    #[cfg(feature = "lmdb")]
    pub use crate::storage::LmdbPersistence;
    pub use crate::storage::{FilePersistence, InMemoryPersistence};

    // === Config ===
    pub use crate::config::{CartConfig, InventoryConfig, StorageConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
}
