//! Tessera Storage Layer
//!
//! Durable key/value slots that survive a restart.
//! Stores hold plain strings; callers own the encoding.

mod database;
mod error;
mod memory;
mod migrations;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::KeyValueStore;

pub type Result<T> = std::result::Result<T, StorageError>;
