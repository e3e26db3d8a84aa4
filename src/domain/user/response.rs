//! Client-visible user shape

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::User;
use crate::domain::storage::Entity;
use crate::domain::EntityId;

/// The id is exposed as `user_id`; the password hash is never exposed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub user_id: EntityId,
    pub name: String,
    pub email: String,
    pub subscription: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id().clone(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            subscription: user.has_subscription(),
            created_at: user.created_at(),
        }
    }
}
