//! Storage domain - Entity contract and store adapter abstraction

mod entity;
mod repository;

pub use entity::{field_value, sort_canonical, Entity, EntityKind, ParentLink};
pub use repository::EntityStore;

#[cfg(test)]
pub use repository::mock;
