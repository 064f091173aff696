//! Persistence backends for cart snapshots

pub mod codec;
pub mod file;
pub mod in_memory;
#[cfg(feature = "lmdb")]
pub mod lmdb;

pub use file::FilePersistence;
pub use in_memory::InMemoryPersistence;
#[cfg(feature = "lmdb")]
pub use lmdb::LmdbPersistence;
