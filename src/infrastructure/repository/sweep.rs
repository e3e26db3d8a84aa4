//! Refresh sweep: full rebuild of a kind's cached views from the store

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::domain::storage::{sort_canonical, Entity, EntityKind};
use crate::domain::{DomainError, EntityId};

use super::cached::CachedRepository;

/// Outcome of a successful refresh sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub kind: EntityKind,
    /// Entities read back from the store
    pub entities: usize,
    pub keys_written: usize,
    /// Parent-group keys removed because the group emptied
    pub groups_pruned: usize,
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} entities, {} keys written, {} groups pruned",
            self.kind, self.entities, self.keys_written, self.groups_pruned
        )
    }
}

/// A cache key operation that failed during a sweep
type KeyFailure = (String, DomainError);

fn encode<V: Serialize + ?Sized>(kind: EntityKind, key: &str, value: &V) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| {
        DomainError::internal(format!(
            "{} refresh could not serialize '{}': {}",
            kind, key, e
        ))
    })
}

impl<E> CachedRepository<E>
where
    E: Entity,
{
    /// Rebuilds every cached view of this kind from a single `find_all`.
    ///
    /// Overwrites `<ns>:all`, every `<ns>:<id>` and every non-empty parent
    /// group, and deletes parent-group keys whose group is now empty. All key
    /// operations run concurrently and each is attempted regardless of the
    /// others; any failure makes the whole sweep `Internal`.
    pub async fn refresh(&self) -> Result<SweepReport, DomainError> {
        let entities = self.store.find_all().await.map_err(|e| {
            error!(kind = %E::KIND, error = %e, "Refresh could not re-read the store");
            DomainError::internal(format!("{} refresh failed to re-read store: {}", E::KIND, e))
        })?;

        let mut groups: BTreeMap<EntityId, Vec<E>> = BTreeMap::new();
        for entity in &entities {
            if let Some(parent_id) = entity.parent_id() {
                groups
                    .entry(parent_id.clone())
                    .or_default()
                    .push(entity.clone());
            }
        }
        for members in groups.values_mut() {
            sort_canonical(members);
        }

        let mut writes: Vec<(String, String)> = Vec::with_capacity(1 + entities.len() + groups.len());

        let all_key = self.keys.all();
        writes.push((all_key.clone(), encode(E::KIND, &all_key, &entities)?));

        for entity in &entities {
            let key = self.keys.entity(entity.id());
            let value = encode(E::KIND, &key, entity)?;
            writes.push((key, value));
        }

        for (parent_id, members) in &groups {
            if let Some(key) = self.keys.parent_group(parent_id) {
                let value = encode(E::KIND, &key, members)?;
                writes.push((key, value));
            }
        }

        let cache = self.cache.as_ref();
        let write_all = join_all(writes.iter().map(|(key, value)| async move {
            cache
                .set_raw(key, value)
                .await
                .map_err(|e| (key.clone(), e))
        }));

        let (write_results, (groups_pruned, mut failures)) =
            futures::join!(write_all, self.prune_empty_groups(&groups));

        let keys_written = write_results.iter().filter(|r| r.is_ok()).count();
        failures.extend(write_results.into_iter().filter_map(Result::err));

        if !failures.is_empty() {
            for (key, e) in &failures {
                error!(kind = %E::KIND, key = %key, error = %e, "Refresh failed on cache key");
            }

            let details: Vec<String> = failures
                .iter()
                .map(|(key, e)| format!("'{}': {}", key, e))
                .collect();

            return Err(DomainError::internal(format!(
                "{} refresh failed on {} cache key(s): {}",
                E::KIND,
                failures.len(),
                details.join("; ")
            )));
        }

        let report = SweepReport {
            kind: E::KIND,
            entities: entities.len(),
            keys_written,
            groups_pruned,
        };

        info!(
            kind = %E::KIND,
            entities = report.entities,
            keys_written = report.keys_written,
            groups_pruned = report.groups_pruned,
            "Refresh sweep completed"
        );

        Ok(report)
    }

    /// Deletes parent-group keys whose parent is absent from `live`
    async fn prune_empty_groups(
        &self,
        live: &BTreeMap<EntityId, Vec<E>>,
    ) -> (usize, Vec<KeyFailure>) {
        let Some(pattern) = self.keys.parent_group_pattern() else {
            return (0, Vec::new());
        };

        let existing = match self.cache.keys(&pattern).await {
            Ok(keys) => keys,
            Err(e) => return (0, vec![(pattern, e)]),
        };

        let live: HashSet<&str> = live.keys().map(EntityId::as_str).collect();
        let stale: Vec<String> = existing
            .into_iter()
            .filter(|key| {
                self.keys
                    .parent_id_of(key)
                    .is_some_and(|parent_id| !live.contains(parent_id))
            })
            .collect();

        if stale.is_empty() {
            return (0, Vec::new());
        }

        debug!(kind = %E::KIND, count = stale.len(), "Pruning emptied parent groups");

        let cache = self.cache.as_ref();
        let results = join_all(stale.iter().map(|key| async move {
            cache.delete(key).await.map_err(|e| (key.clone(), e))
        }))
        .await;

        let pruned = results.iter().filter(|r| r.is_ok()).count();
        let failures = results.into_iter().filter_map(Result::err).collect();

        (pruned, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use crate::domain::cache::{Cache, MockCache};
    use crate::domain::step::{Step, StepDraft, StepPatch};
    use crate::domain::storage::mock::{MockStore, StoreOperation};
    use crate::domain::travel::{Travel, TravelDraft, TravelPatch};
    use crate::domain::user::{User, UserDraft};
    use crate::infrastructure::storage::InMemoryStore;

    fn id(value: &str) -> EntityId {
        EntityId::new(value).unwrap()
    }

    fn repo<E: Entity>(cache: Arc<MockCache>) -> CachedRepository<E> {
        CachedRepository::new(Arc::new(InMemoryStore::<E>::new()), cache)
    }

    fn travel(travel_id: &str, user_id: &str) -> Travel {
        Travel::from_draft(
            id(travel_id),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            TravelDraft::new(id(user_id), "Trip"),
        )
    }

    #[tokio::test]
    async fn test_sweep_writes_every_view() {
        let cache = Arc::new(MockCache::new());
        let store = MockStore::new()
            .with_entity(travel("T1", "U1"))
            .with_entity(travel("T2", "U1"))
            .with_entity(travel("T3", "U2"));
        let repo: CachedRepository<Travel> = CachedRepository::new(Arc::new(store), cache.clone());

        let report = repo.refresh().await.unwrap();

        assert_eq!(report.entities, 3);
        assert_eq!(report.keys_written, 6);
        assert_eq!(report.groups_pruned, 0);

        let keys: Vec<String> = cache.snapshot().into_keys().collect();
        assert_eq!(
            keys,
            vec![
                "travel:T1",
                "travel:T2",
                "travel:T3",
                "travel:all",
                "travel:user:U1",
                "travel:user:U2",
            ]
        );
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let cache = Arc::new(MockCache::new());
        let steps: CachedRepository<Step> = repo(cache.clone());
        let day = |d| Utc.with_ymd_and_hms(2024, 7, d, 8, 0, 0).unwrap();

        steps
            .create(StepDraft::new(id("T1"), "hotel", "B", "Lyon").starting_at(day(2)))
            .await
            .unwrap();
        steps
            .create(StepDraft::new(id("T1"), "flight", "A", "CDG").starting_at(day(1)))
            .await
            .unwrap();

        steps.refresh().await.unwrap();
        let first = cache.snapshot();
        steps.refresh().await.unwrap();

        assert_eq!(cache.snapshot(), first);
    }

    #[tokio::test]
    async fn test_parent_group_integrity_after_writes() {
        let cache = Arc::new(MockCache::new());
        let travels: CachedRepository<Travel> = repo(cache.clone());

        let a = travels.create(TravelDraft::new(id("U1"), "A")).await.unwrap();
        travels.create(TravelDraft::new(id("U2"), "B")).await.unwrap();
        travels.create(TravelDraft::new(id("U1"), "C")).await.unwrap();
        travels.delete(&a.id).await.unwrap();

        let stored = travels.store().find_all().await.unwrap();
        for (key, raw) in cache.snapshot() {
            let Some(parent) = travels.keys().parent_id_of(&key) else {
                continue;
            };
            let cached: Vec<Travel> = serde_json::from_str(&raw).unwrap();
            let expected: Vec<Travel> = stored
                .iter()
                .filter(|t| t.user_id().as_str() == parent)
                .cloned()
                .collect();
            assert_eq!(cached, expected, "group {}", key);
        }
    }

    #[tokio::test]
    async fn test_reassignment_prunes_emptied_group() {
        let cache = Arc::new(MockCache::new());
        let steps: CachedRepository<Step> = repo(cache.clone());

        let step = steps
            .create(StepDraft::new(id("T1"), "flight", "Leg", "JFK"))
            .await
            .unwrap();
        assert!(cache.snapshot().contains_key("step:travel:T1"));

        steps
            .update(&step.id, StepPatch::default().with_travel(id("T2")))
            .await
            .unwrap();

        let snapshot = cache.snapshot();
        assert!(!snapshot.contains_key("step:travel:T1"));
        assert!(snapshot.contains_key("step:travel:T2"));
        assert!(matches!(
            steps.read_by_parent(&id("T1")).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_deleting_last_member_prunes_group() {
        let cache = Arc::new(MockCache::new());
        let travels: CachedRepository<Travel> = repo(cache.clone());

        let only = travels.create(TravelDraft::new(id("U1"), "Solo")).await.unwrap();
        travels.delete(&only.id).await.unwrap();

        let keys: Vec<String> = cache.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["travel:all"]);
    }

    #[tokio::test]
    async fn test_partial_failure_attempts_every_key() {
        let cache = Arc::new(MockCache::new());
        let store = MockStore::new()
            .with_entity(travel("T1", "U1"))
            .with_entity(travel("T2", "U2"));
        let repo: CachedRepository<Travel> = CachedRepository::new(Arc::new(store), cache.clone());
        cache.fail_writes_to("travel:all");

        let result = repo.refresh().await;

        assert!(matches!(result, Err(DomainError::Internal { .. })));
        let mut attempted = cache.attempted_writes();
        attempted.sort();
        assert_eq!(
            attempted,
            vec![
                "travel:T1",
                "travel:T2",
                "travel:all",
                "travel:user:U1",
                "travel:user:U2",
            ]
        );
        assert_eq!(cache.snapshot().len(), 4);
    }

    #[tokio::test]
    async fn test_store_reread_failure_is_internal() {
        let cache = Arc::new(MockCache::new());
        let store = Arc::new(MockStore::<Travel>::new());
        let repo: CachedRepository<Travel> = CachedRepository::new(store.clone(), cache.clone());
        store.fail(StoreOperation::FindAll, "connection reset");

        let result = repo.create(TravelDraft::new(id("U1"), "Trip")).await;

        assert!(matches!(result, Err(DomainError::Internal { .. })));
        assert_eq!(store.snapshot().len(), 1);
        assert!(cache.attempted_writes().is_empty());

        // Operator re-trigger once the store recovers
        store.recover(StoreOperation::FindAll);
        let report = repo.refresh().await.unwrap();
        assert_eq!(report.entities, 1);
    }

    #[tokio::test]
    async fn test_parentless_kind_writes_no_groups() {
        let cache = Arc::new(MockCache::new());
        let users: CachedRepository<User> = repo(cache.clone());

        users
            .create(UserDraft::new("Ada", "ada@example.com", "hash"))
            .await
            .unwrap();

        let report = users.refresh().await.unwrap();
        assert_eq!(report.keys_written, 2);
        assert_eq!(cache.size().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_writers_converge() {
        let cache = Arc::new(MockCache::new());
        let travels: CachedRepository<Travel> = repo(cache.clone());

        let (a, b, c) = tokio::join!(
            travels.create(TravelDraft::new(id("U1"), "A")),
            travels.create(TravelDraft::new(id("U1"), "B")),
            travels.create(TravelDraft::new(id("U2"), "C")),
        );
        let a = a.unwrap();
        b.unwrap();
        c.unwrap();

        travels
            .update(&a.id, TravelPatch::default().with_title("A2"))
            .await
            .unwrap();

        let mut cached = travels.read_all().await.unwrap();
        let mut stored: Vec<_> = travels
            .store()
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(Entity::project)
            .collect();
        cached.sort_by(|x, y| x.id.cmp(&y.id));
        stored.sort_by(|x, y| x.id.cmp(&y.id));

        assert_eq!(cached, stored);
    }

    #[test]
    fn test_report_display() {
        let report = SweepReport {
            kind: EntityKind::Step,
            entities: 4,
            keys_written: 7,
            groups_pruned: 1,
        };

        assert_eq!(
            report.to_string(),
            "step: 4 entities, 7 keys written, 1 groups pruned"
        );
    }
}
