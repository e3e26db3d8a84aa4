//! Client-visible subscription shape

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::Subscription;
use crate::domain::storage::Entity;
use crate::domain::EntityId;

/// Soft-delete flag is internal and not exposed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionResponse {
    pub id: EntityId,
    pub user_id: EntityId,
    pub stripe_customer_id: String,
    pub statut: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id().clone(),
            user_id: subscription.user_id().clone(),
            stripe_customer_id: subscription.stripe_customer_id().to_string(),
            statut: subscription.statut().to_string(),
            start_date: subscription.start_date(),
            end_date: subscription.end_date(),
            created_at: subscription.created_at(),
        }
    }
}
