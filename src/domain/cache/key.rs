//! Cache key layout for entity read views

use regex::Regex;

use crate::domain::storage::{Entity, EntityKind, ParentLink};
use crate::domain::{DomainError, EntityId};

const ALL_SEGMENT: &str = "all";

/// Key layout of one entity kind's derived read views:
///
/// - `<ns>:<id>` single entity
/// - `<ns>:all` full collection
/// - `<ns>:<parent-ns>:<parent-id>` entities sharing a parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyspace {
    namespace: &'static str,
    parent_namespace: Option<&'static str>,
}

impl CacheKeyspace {
    pub fn new(kind: EntityKind, parent: Option<ParentLink>) -> Self {
        Self {
            namespace: kind.namespace(),
            parent_namespace: parent.map(|link| link.kind.namespace()),
        }
    }

    /// Keyspace of an entity type
    pub fn of<E: Entity>() -> Self {
        Self::new(E::KIND, E::PARENT)
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn entity(&self, id: &EntityId) -> String {
        format!("{}:{}", self.namespace, id)
    }

    pub fn all(&self) -> String {
        format!("{}:{}", self.namespace, ALL_SEGMENT)
    }

    /// Parent-group key, `None` for kinds without a parent reference
    pub fn parent_group(&self, parent_id: &EntityId) -> Option<String> {
        self.parent_namespace
            .map(|parent| format!("{}:{}:{}", self.namespace, parent, parent_id))
    }

    /// Glob matching every parent-group key of this kind
    pub fn parent_group_pattern(&self) -> Option<String> {
        self.parent_namespace
            .map(|parent| format!("{}:{}:*", self.namespace, parent))
    }

    /// Extracts the parent id from a parent-group key of this kind
    pub fn parent_id_of<'k>(&self, key: &'k str) -> Option<&'k str> {
        let parent = self.parent_namespace?;
        let rest = key.strip_prefix(self.namespace)?.strip_prefix(':')?;
        let id = rest.strip_prefix(parent)?.strip_prefix(':')?;

        if id.is_empty() || id.contains(':') {
            None
        } else {
            Some(id)
        }
    }

    /// Glob matching every key of this kind
    pub fn namespace_pattern(&self) -> String {
        format!("{}:*", self.namespace)
    }
}

/// Compiles a Redis-style glob (`*` wildcard only) into an anchored regex
pub fn glob_regex(pattern: &str) -> Result<Regex, DomainError> {
    let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
    let source = format!("^{}$", escaped.join(".*"));

    Regex::new(&source).map_err(|e| DomainError::cache(format!("Invalid pattern: {}", e)))
}
