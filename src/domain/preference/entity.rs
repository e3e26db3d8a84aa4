//! Preference entity - per-user display and routing settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::PreferenceResponse;
use crate::domain::storage::{Entity, EntityKind, ParentLink};
use crate::domain::EntityId;

/// Transport mode used when drawing routes between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Driving,
    Walking,
    Flying,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RoutePreferences {
    #[serde(default)]
    pub show_routes: bool,
    #[serde(default)]
    pub default_transport_mode: TransportMode,
    #[serde(default)]
    pub auto_show_routes: bool,
}

pub type OtherPreferences = serde_json::Map<String, serde_json::Value>;

/// One preference document per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    id: EntityId,
    user_id: EntityId,
    #[serde(default)]
    route_preferences: RoutePreferences,
    #[serde(default)]
    other_preferences: OtherPreferences,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Preference {
    pub fn user_id(&self) -> &EntityId {
        &self.user_id
    }

    pub fn route_preferences(&self) -> &RoutePreferences {
        &self.route_preferences
    }

    pub fn other_preferences(&self) -> &OtherPreferences {
        &self.other_preferences
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Payload for creating a preference document
#[derive(Debug, Clone)]
pub struct PreferenceDraft {
    pub user_id: EntityId,
    pub route_preferences: Option<RoutePreferences>,
    pub other_preferences: Option<OtherPreferences>,
}

impl PreferenceDraft {
    pub fn new(user_id: EntityId) -> Self {
        Self {
            user_id,
            route_preferences: None,
            other_preferences: None,
        }
    }

    pub fn with_routes(mut self, routes: RoutePreferences) -> Self {
        self.route_preferences = Some(routes);
        self
    }

    pub fn with_other(mut self, other: OtherPreferences) -> Self {
        self.other_preferences = Some(other);
        self
    }
}

/// Partial update of a preference document
#[derive(Debug, Clone, Default)]
pub struct PreferencePatch {
    pub route_preferences: Option<RoutePreferences>,
    pub other_preferences: Option<OtherPreferences>,
}

impl From<PreferenceDraft> for PreferencePatch {
    fn from(draft: PreferenceDraft) -> Self {
        Self {
            route_preferences: draft.route_preferences,
            other_preferences: draft.other_preferences,
        }
    }
}

impl Entity for Preference {
    type Draft = PreferenceDraft;
    type Patch = PreferencePatch;
    type Response = PreferenceResponse;

    const KIND: EntityKind = EntityKind::Preference;
    const PARENT: Option<ParentLink> = Some(ParentLink {
        field: "user_id",
        kind: EntityKind::User,
    });
    const UNIQUE_FIELDS: &'static [&'static str] = &["user_id"];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.user_id)
    }

    fn from_draft(id: EntityId, now: DateTime<Utc>, draft: PreferenceDraft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            route_preferences: draft.route_preferences.unwrap_or_default(),
            other_preferences: draft.other_preferences.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: PreferencePatch, now: DateTime<Utc>) {
        if let Some(routes) = patch.route_preferences {
            self.route_preferences = routes;
        }
        if let Some(other) = patch.other_preferences {
            self.other_preferences = other;
        }
        self.updated_at = now;
    }

    fn project(&self) -> PreferenceResponse {
        PreferenceResponse::from(self)
    }
}
