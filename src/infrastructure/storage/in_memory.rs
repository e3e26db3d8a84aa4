//! In-memory store implementation

use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::storage::{field_value, Entity, EntityStore};
use crate::domain::{DomainError, EntityId};

/// Thread-safe in-memory store.
///
/// Keeps insertion order, which is the store order reported by `find_all`.
/// Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryStore<E>
where
    E: Entity,
{
    entities: RwLock<Vec<E>>,
}

impl<E> Default for InMemoryStore<E>
where
    E: Entity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStore<E>
where
    E: Entity,
{
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store pre-populated with entities
    pub fn with_entities(entities: Vec<E>) -> Self {
        Self {
            entities: RwLock::new(entities),
        }
    }
}

/// Rejects `candidate` if it shares a unique field value with another entity
fn check_unique<E: Entity>(existing: &[E], candidate: &E) -> Result<(), DomainError> {
    for field in E::UNIQUE_FIELDS {
        let Some(value) = field_value(candidate, field)? else {
            continue;
        };

        for other in existing.iter().filter(|e| e.id() != candidate.id()) {
            if field_value(other, field)?.as_ref() == Some(&value) {
                return Err(DomainError::validation(format!(
                    "{} with {} {} already exists",
                    E::KIND,
                    field,
                    value
                )));
            }
        }
    }

    Ok(())
}

#[async_trait]
impl<E> EntityStore<E> for InMemoryStore<E>
where
    E: Entity,
{
    async fn create(&self, draft: E::Draft) -> Result<E, DomainError> {
        let entity = E::from_draft(EntityId::generate(), Utc::now(), draft);
        let mut entities = self.entities.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        check_unique(&entities, &entity)?;
        entities.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<E>, DomainError> {
        let entities = self.entities.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entities.iter().find(|e| e.id() == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<E>, DomainError> {
        let entities = self.entities.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entities.clone())
    }

    async fn find_by_field(
        &self,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<E>, DomainError> {
        let entities = self.entities.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut matches = Vec::new();

        for entity in entities.iter() {
            if field_value(entity, field)?.as_ref() == Some(value) {
                matches.push(entity.clone());
            }
        }

        Ok(matches)
    }

    async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<Option<E>, DomainError> {
        let mut entities = self.entities.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let Some(index) = entities.iter().position(|e| e.id() == id) else {
            return Ok(None);
        };

        let mut merged = entities[index].clone();
        merged.apply_patch(patch, Utc::now());
        check_unique(&entities, &merged)?;

        entities[index] = merged.clone();
        Ok(Some(merged))
    }

    async fn delete(&self, id: &EntityId) -> Result<Option<E>, DomainError> {
        let mut entities = self.entities.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(entities
            .iter()
            .position(|e| e.id() == id)
            .map(|index| entities.remove(index)))
    }
}
