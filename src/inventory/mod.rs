//! Inventory and catalog backends

#[cfg(feature = "http")]
pub mod http;
pub mod in_memory;

#[cfg(feature = "http")]
pub use http::HttpInventory;
pub use in_memory::InMemoryInventory;
