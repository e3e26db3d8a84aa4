//! Store adapter trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::{DomainError, EntityId};

use super::entity::Entity;

/// Durable persistence for one entity kind.
///
/// "Not found" is never an error here: lookups, updates and deletes return
/// `None` and the caller decides the policy.
#[async_trait]
pub trait EntityStore<E>: Send + Sync + Debug
where
    E: Entity,
{
    /// Persists a new entity with a store-assigned id and creation timestamp
    async fn create(&self, draft: E::Draft) -> Result<E, DomainError>;

    /// Retrieves an entity by id
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities in store order
    async fn find_all(&self) -> Result<Vec<E>, DomainError>;

    /// Retrieves all entities whose top-level `field` equals `value`
    async fn find_by_field(
        &self,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<E>, DomainError>;

    /// Merges a patch into the stored entity and returns the merged result
    async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<Option<E>, DomainError>;

    /// Removes an entity and returns what was removed
    async fn delete(&self, id: &EntityId) -> Result<Option<E>, DomainError>;
}
