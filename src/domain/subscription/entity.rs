//! Subscription entity - a user's billing subscription

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::response::SubscriptionResponse;
use crate::domain::storage::{Entity, EntityKind, ParentLink};
use crate::domain::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    id: EntityId,
    user_id: EntityId,
    stripe_customer_id: String,
    statut: String,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    deleted: bool,
    created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn user_id(&self) -> &EntityId {
        &self.user_id
    }

    pub fn stripe_customer_id(&self) -> &str {
        &self.stripe_customer_id
    }

    /// Billing status as reported by the payment provider
    pub fn statut(&self) -> &str {
        &self.statut
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// Payload for creating a subscription
#[derive(Debug, Clone)]
pub struct SubscriptionDraft {
    pub user_id: EntityId,
    pub stripe_customer_id: String,
    pub statut: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl SubscriptionDraft {
    pub fn new(
        user_id: EntityId,
        stripe_customer_id: impl Into<String>,
        statut: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            stripe_customer_id: stripe_customer_id.into(),
            statut: statut.into(),
            start_date: None,
            end_date: None,
        }
    }
}

/// Partial update of a subscription
#[derive(Debug, Clone, Default)]
pub struct SubscriptionPatch {
    pub stripe_customer_id: Option<String>,
    pub statut: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub deleted: Option<bool>,
}

impl SubscriptionPatch {
    pub fn with_statut(mut self, statut: impl Into<String>) -> Self {
        self.statut = Some(statut.into());
        self
    }
}

impl Entity for Subscription {
    type Draft = SubscriptionDraft;
    type Patch = SubscriptionPatch;
    type Response = SubscriptionResponse;

    const KIND: EntityKind = EntityKind::Subscription;
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

    fn from_draft(id: EntityId, now: DateTime<Utc>, draft: SubscriptionDraft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            stripe_customer_id: draft.stripe_customer_id,
            statut: draft.statut,
            start_date: draft.start_date,
            end_date: draft.end_date,
            deleted: false,
            created_at: now,
        }
    }

    fn apply_patch(&mut self, patch: SubscriptionPatch, _now: DateTime<Utc>) {
        if let Some(customer) = patch.stripe_customer_id {
            self.stripe_customer_id = customer;
        }
        if let Some(statut) = patch.statut {
            self.statut = statut;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(deleted) = patch.deleted {
            self.deleted = deleted;
        }
    }

    fn project(&self) -> SubscriptionResponse {
        SubscriptionResponse::from(self)
    }
}
