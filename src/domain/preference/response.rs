//! Client-visible preference shape

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{OtherPreferences, Preference, RoutePreferences};
use crate::domain::storage::Entity;
use crate::domain::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceResponse {
    pub id: EntityId,
    pub user_id: EntityId,
    pub route_preferences: RoutePreferences,
    pub other_preferences: OtherPreferences,
    pub updated_at: DateTime<Utc>,
}

impl From<&Preference> for PreferenceResponse {
    fn from(preference: &Preference) -> Self {
        Self {
            id: preference.id().clone(),
            user_id: preference.user_id().clone(),
            route_preferences: preference.route_preferences().clone(),
            other_preferences: preference.other_preferences().clone(),
            updated_at: preference.updated_at(),
        }
    }
}
