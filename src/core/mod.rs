//! Core module containing the cart model, validation rules and collaborator traits

pub mod cart;
pub mod error;
pub mod events;
pub mod service;
pub mod stock;
pub mod store;

pub use cart::{Cart, CartEntry, DuplicateEntry, Product, ProductId};
pub use error::{CartError, ErrorResponse};
pub use events::{CartEnvelope, CartEvent, EventBus};
pub use service::{InventoryClient, PersistenceStore, ProductCatalog};
pub use stock::StockSnapshot;
pub use store::CartStore;
