//! User entity and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::UserResponse;
use crate::domain::storage::{Entity, EntityKind};
use crate::domain::EntityId;

/// Account holder; the root owner of travels, subscriptions and preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: EntityId,
    name: String,
    email: String,
    /// Opaque credential produced by the auth layer, never projected
    password_hash: String,
    #[serde(default)]
    subscription: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Payload for creating a user
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub subscription: bool,
}

impl UserDraft {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            subscription: false,
        }
    }
}

/// Partial update of a user
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub subscription: Option<bool>,
}

impl UserPatch {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_subscription(mut self, subscription: bool) -> Self {
        self.subscription = Some(subscription);
        self
    }
}

impl Entity for User {
    type Draft = UserDraft;
    type Patch = UserPatch;
    type Response = UserResponse;

    const KIND: EntityKind = EntityKind::User;
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: EntityId, now: DateTime<Utc>, draft: UserDraft) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            password_hash: draft.password_hash,
            subscription: draft.subscription,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(subscription) = patch.subscription {
            self.subscription = subscription;
        }
        self.updated_at = now;
    }

    fn project(&self) -> UserResponse {
        UserResponse::from(self)
    }
}
