//! Opaque entity identifier shared by every entity kind

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

const MAX_ID_LENGTH: usize = 128;

/// Store-assigned identifier.
///
/// Parent references use the same type, so the repository only ever compares
/// ids for equality and uses them as map keys. Ids never contain `:`, which
/// keeps cache keys built from them unambiguous, and `all` is reserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Creates an id after validation
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if id.is_empty() {
            return Err(DomainError::invalid_id("id cannot be empty"));
        }

        if id.len() > MAX_ID_LENGTH {
            return Err(DomainError::invalid_id(format!(
                "id cannot exceed {} characters",
                MAX_ID_LENGTH
            )));
        }

        if id.chars().any(|c| c == ':' || c.is_whitespace()) {
            return Err(DomainError::invalid_id(format!(
                "id '{}' contains ':' or whitespace",
                id
            )));
        }

        // `<ns>:all` is the collection cache key
        if id == "all" {
            return Err(DomainError::invalid_id("id 'all' is reserved"));
        }

        Ok(Self(id))
    }

    /// Generates a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EntityId {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
