//! Travel entity and its create/update payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::TravelResponse;
use crate::domain::storage::{Entity, EntityKind, ParentLink};
use crate::domain::EntityId;

/// A travel itinerary owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Travel {
    id: EntityId,
    user_id: EntityId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Travel {
    pub fn user_id(&self) -> &EntityId {
        &self.user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Payload for creating a travel
#[derive(Debug, Clone)]
pub struct TravelDraft {
    pub user_id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TravelDraft {
    pub fn new(user_id: EntityId, title: impl Into<String>) -> Self {
        Self {
            user_id,
            title: title.into(),
            description: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_dates(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

/// Partial update of a travel
#[derive(Debug, Clone, Default)]
pub struct TravelPatch {
    pub user_id: Option<EntityId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TravelPatch {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_user(mut self, user_id: EntityId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

impl Entity for Travel {
    type Draft = TravelDraft;
    type Patch = TravelPatch;
    type Response = TravelResponse;

    const KIND: EntityKind = EntityKind::Travel;
    const PARENT: Option<ParentLink> = Some(ParentLink {
        field: "user_id",
        kind: EntityKind::User,
    });

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.user_id)
    }

    fn from_draft(id: EntityId, now: DateTime<Utc>, draft: TravelDraft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            title: draft.title,
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: TravelPatch, now: DateTime<Utc>) {
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = Some(end_date);
        }
        self.updated_at = now;
    }

    fn project(&self) -> TravelResponse {
        TravelResponse::from(self)
    }
}
