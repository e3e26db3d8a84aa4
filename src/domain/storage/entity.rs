//! Entity kinds and the contract every stored kind implements

use std::cmp::Ordering;
use std::fmt::Debug;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{DomainError, EntityId};

/// The entity kinds managed by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    User,
    Travel,
    Step,
    Subscription,
    Preference,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::User,
        EntityKind::Travel,
        EntityKind::Step,
        EntityKind::Subscription,
        EntityKind::Preference,
    ];

    /// Cache namespace, the first segment of every cache key of this kind
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Travel => "travel",
            Self::Step => "step",
            Self::Subscription => "subscription",
            Self::Preference => "preference",
        }
    }

    /// Backing table / collection name
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Travel => "travels",
            Self::Step => "steps",
            Self::Subscription => "subscriptions",
            Self::Preference => "preferences",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.namespace())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" | "users" => Ok(Self::User),
            "travel" | "travels" => Ok(Self::Travel),
            "step" | "steps" => Ok(Self::Step),
            "subscription" | "subscriptions" => Ok(Self::Subscription),
            "preference" | "preferences" => Ok(Self::Preference),
            _ => Err(DomainError::validation(format!(
                "Unknown entity kind: {}. Valid kinds: user, travel, step, subscription, preference",
                s
            ))),
        }
    }
}

/// Reference from an entity to its owning entity of another kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    /// Field on the child holding the parent id (e.g. `travel_id`)
    pub field: &'static str,
    /// Kind of the owning entity
    pub kind: EntityKind,
}

/// Trait for types persisted by an [`EntityStore`](super::EntityStore)
/// and cached by the coherent repository.
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Creation payload, already validated by the caller
    type Draft: Debug + Send + Sync + 'static;
    /// Partial update payload; absent fields are left untouched
    type Patch: Debug + Send + Sync + 'static;
    /// Client-visible shape
    type Response: Debug + Clone + Send + Sync + Serialize + PartialEq;

    const KIND: EntityKind;
    const PARENT: Option<ParentLink> = None;
    /// Fields whose values must be unique across the collection
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> &EntityId;

    fn created_at(&self) -> DateTime<Utc>;

    fn parent_id(&self) -> Option<&EntityId> {
        None
    }

    /// Builds the persisted entity from a draft with store-assigned id and timestamp
    fn from_draft(id: EntityId, now: DateTime<Utc>, draft: Self::Draft) -> Self;

    /// Merges a patch into the entity
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Projection to the client-visible shape
    fn project(&self) -> Self::Response;

    /// Canonical order within a parent group
    fn canonical_cmp(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }
}

/// Stable sort by the kind's canonical order
pub fn sort_canonical<E: Entity>(entities: &mut [E]) {
    entities.sort_by(|a, b| a.canonical_cmp(b));
}

/// Reads a top-level field of the entity's persisted shape
pub fn field_value<E: Entity>(
    entity: &E,
    field: &str,
) -> Result<Option<serde_json::Value>, DomainError> {
    let value = serde_json::to_value(entity).map_err(|e| {
        DomainError::storage(format!("Failed to serialize {}: {}", E::KIND, e))
    })?;

    Ok(match value {
        serde_json::Value::Object(mut map) => map.remove(field).filter(|v| !v.is_null()),
        _ => None,
    })
}
