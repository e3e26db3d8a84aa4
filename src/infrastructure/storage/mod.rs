//! Store adapters: in-memory and PostgreSQL document tables

mod factory;
mod in_memory;
mod postgres;

pub use factory::{StorageBackend, StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryStore;
pub use postgres::{connect_pool, PostgresConfig, PostgresStore};
