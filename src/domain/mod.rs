//! Domain layer - Entities, cache and storage contracts

pub mod cache;
pub mod error;
pub mod id;
pub mod preference;
pub mod step;
pub mod storage;
pub mod subscription;
pub mod travel;
pub mod user;

pub use error::DomainError;
pub use id::EntityId;
pub use storage::{Entity, EntityKind, EntityStore};
