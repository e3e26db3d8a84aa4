//! Subscription lookups

use crate::domain::subscription::{Subscription, SubscriptionResponse};
use crate::domain::{DomainError, EntityId};

use super::cached::CachedRepository;

impl CachedRepository<Subscription> {
    /// Reads the first subscription of a user
    pub async fn read_for_user(
        &self,
        user_id: &EntityId,
    ) -> Result<SubscriptionResponse, DomainError> {
        self.read_by_parent(user_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                DomainError::not_found(format!("No subscription found for user {}", user_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::cache::MockCache;
    use crate::domain::subscription::{SubscriptionDraft, SubscriptionPatch};
    use crate::infrastructure::storage::InMemoryStore;

    fn id(value: &str) -> EntityId {
        EntityId::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_read_for_user_returns_first_subscription() {
        let cache = Arc::new(MockCache::new());
        let subs: CachedRepository<Subscription> =
            CachedRepository::new(Arc::new(InMemoryStore::new()), cache.clone());

        let first = subs
            .create(SubscriptionDraft::new(id("U1"), "cus_1", "active"))
            .await
            .unwrap();
        subs.create(SubscriptionDraft::new(id("U1"), "cus_2", "canceled"))
            .await
            .unwrap();

        let found = subs.read_for_user(&id("U1")).await.unwrap();
        assert_eq!(found, first);

        let updated = subs
            .update(&first.id, SubscriptionPatch::default().with_statut("past_due"))
            .await
            .unwrap();
        assert_eq!(subs.read_for_user(&id("U1")).await.unwrap(), updated);

        // The deleted flag is persisted but never projected
        let raw = &cache.snapshot()[&format!("subscription:{}", first.id)];
        assert!(raw.contains("\"deleted\":false"));
        assert!(!serde_json::to_string(&updated).unwrap().contains("deleted"));
    }

    #[tokio::test]
    async fn test_read_for_user_without_subscription() {
        let subs: CachedRepository<Subscription> = CachedRepository::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(MockCache::new()),
        );

        let result = subs.read_for_user(&id("U1")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }
}
