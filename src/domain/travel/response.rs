//! Client-visible travel shape

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::Travel;
use crate::domain::storage::Entity;
use crate::domain::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelResponse {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Travel> for TravelResponse {
    fn from(travel: &Travel) -> Self {
        Self {
            id: travel.id().clone(),
            user_id: travel.user_id().clone(),
            title: travel.title().to_string(),
            description: travel.description().map(str::to_string),
            start_date: travel.start_date(),
            end_date: travel.end_date(),
            created_at: travel.created_at(),
            updated_at: travel.updated_at(),
        }
    }
}
