//! WeKnora Storage Layer
//!
//! Durable key-value slots backing the console's persisted state.
//! Every backend implements [`KeyValueStore`]; callers never see which one
//! they were handed.

mod database;
mod error;
mod memory;
mod migrations;
mod store;

pub use database::SqliteStore;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::KeyValueStore;

pub type Result<T> = std::result::Result<T, StorageError>;
