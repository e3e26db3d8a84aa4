//! Client-visible step shape

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::Step;
use crate::domain::storage::Entity;
use crate::domain::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResponse {
    pub id: EntityId,
    pub travel_id: EntityId,
    #[serde(rename = "type")]
    pub step_type: String,
    pub title: String,
    pub description: Option<String>,
    pub place: String,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub metadata_fields: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<&Step> for StepResponse {
    fn from(step: &Step) -> Self {
        Self {
            id: step.id().clone(),
            travel_id: step.travel_id().clone(),
            step_type: step.step_type().to_string(),
            title: step.title().to_string(),
            description: step.description().map(str::to_string),
            place: step.place().to_string(),
            location: step.location().map(str::to_string),
            start_date: step.start_date(),
            end_date: step.end_date(),
            metadata_fields: step.metadata_fields().cloned(),
            created_at: step.created_at(),
        }
    }
}
