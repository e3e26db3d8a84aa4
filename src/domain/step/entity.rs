//! Step entity - one leg or stop of a travel

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::StepResponse;
use crate::domain::storage::{Entity, EntityKind, ParentLink};
use crate::domain::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    id: EntityId,
    travel_id: EntityId,
    #[serde(rename = "type")]
    step_type: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    place: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    metadata_fields: Option<serde_json::Value>,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Step {
    pub fn travel_id(&self) -> &EntityId {
        &self.travel_id
    }

    pub fn step_type(&self) -> &str {
        &self.step_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn metadata_fields(&self) -> Option<&serde_json::Value> {
        self.metadata_fields.as_ref()
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }
}

/// Payload for creating a step
#[derive(Debug, Clone)]
pub struct StepDraft {
    pub travel_id: EntityId,
    pub step_type: String,
    pub title: String,
    pub description: Option<String>,
    pub place: String,
    pub location: Option<String>,
    pub metadata_fields: Option<serde_json::Value>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl StepDraft {
    pub fn new(
        travel_id: EntityId,
        step_type: impl Into<String>,
        title: impl Into<String>,
        place: impl Into<String>,
    ) -> Self {
        Self {
            travel_id,
            step_type: step_type.into(),
            title: title.into(),
            description: None,
            place: place.into(),
            location: None,
            metadata_fields: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata_fields = Some(metadata);
        self
    }
}

/// Partial update of a step
#[derive(Debug, Clone, Default)]
pub struct StepPatch {
    pub travel_id: Option<EntityId>,
    pub step_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub place: Option<String>,
    pub location: Option<String>,
    pub metadata_fields: Option<serde_json::Value>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl StepPatch {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Moves the step to another travel
    pub fn with_travel(mut self, travel_id: EntityId) -> Self {
        self.travel_id = Some(travel_id);
        self
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }
}

impl Entity for Step {
    type Draft = StepDraft;
    type Patch = StepPatch;
    type Response = StepResponse;

    const KIND: EntityKind = EntityKind::Step;
    const PARENT: Option<ParentLink> = Some(ParentLink {
        field: "travel_id",
        kind: EntityKind::Travel,
    });

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn parent_id(&self) -> Option<&EntityId> {
        Some(&self.travel_id)
    }

    fn from_draft(id: EntityId, now: DateTime<Utc>, draft: StepDraft) -> Self {
        Self {
            id,
            travel_id: draft.travel_id,
            step_type: draft.step_type,
            title: draft.title,
            description: draft.description,
            place: draft.place,
            location: draft.location,
            metadata_fields: draft.metadata_fields,
            start_date: draft.start_date,
            end_date: draft.end_date,
            created_at: now,
        }
    }

    // Steps carry no update timestamp.
    fn apply_patch(&mut self, patch: StepPatch, _now: DateTime<Utc>) {
        if let Some(travel_id) = patch.travel_id {
            self.travel_id = travel_id;
        }
        if let Some(step_type) = patch.step_type {
            self.step_type = step_type;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(place) = patch.place {
            self.place = place;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(metadata) = patch.metadata_fields {
            self.metadata_fields = Some(metadata);
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = Some(end_date);
        }
    }

    fn project(&self) -> StepResponse {
        StepResponse::from(self)
    }

    /// Steps are ordered by start date, undated steps first
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.start_date.cmp(&other.start_date)
    }
}
