//! Cache-coherent repository over a store adapter

use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::domain::cache::{Cache, CacheExt, CacheKeyspace};
use crate::domain::storage::{sort_canonical, Entity, EntityStore};
use crate::domain::{DomainError, EntityId};

/// Repository serving the read views of one entity kind from the cache,
/// falling back to the store on a miss.
///
/// Every successful mutation is followed by a full refresh sweep (see
/// [`CachedRepository::refresh`]), so after a write returns `Ok` every view
/// reachable from the store state is current. A write whose sweep failed
/// returns `Internal` while the mutation itself stays committed.
pub struct CachedRepository<E>
where
    E: Entity,
{
    pub(super) store: Arc<dyn EntityStore<E>>,
    pub(super) cache: Arc<dyn Cache>,
    pub(super) keys: CacheKeyspace,
}

impl<E> Clone for CachedRepository<E>
where
    E: Entity,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            keys: self.keys.clone(),
        }
    }
}

impl<E> Debug for CachedRepository<E>
where
    E: Entity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRepository")
            .field("kind", &E::KIND)
            .field("store", &self.store)
            .field("cache", &self.cache)
            .finish()
    }
}

impl<E> CachedRepository<E>
where
    E: Entity,
{
    pub fn new(store: Arc<dyn EntityStore<E>>, cache: Arc<dyn Cache>) -> Self {
        Self {
            store,
            cache,
            keys: CacheKeyspace::of::<E>(),
        }
    }

    pub fn keys(&self) -> &CacheKeyspace {
        &self.keys
    }

    pub fn store(&self) -> &Arc<dyn EntityStore<E>> {
        &self.store
    }

    /// Reads one entity by id
    pub async fn read(&self, id: &EntityId) -> Result<E::Response, DomainError> {
        let key = self.keys.entity(id);

        if let Some(entity) = self.cached::<E>("read", &key).await? {
            debug!(kind = %E::KIND, key = %key, "Cache hit");
            return Ok(entity.project());
        }

        debug!(kind = %E::KIND, key = %key, "Cache miss");

        let entity = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("{} {} not found", E::KIND, id)))?;

        self.populate("read", &key, &entity).await?;
        Ok(entity.project())
    }

    /// Reads the full collection
    pub async fn read_all(&self) -> Result<Vec<E::Response>, DomainError> {
        let key = self.keys.all();

        if let Some(entities) = self.cached::<Vec<E>>("read_all", &key).await? {
            debug!(kind = %E::KIND, key = %key, count = entities.len(), "Cache hit");
            return Ok(entities.iter().map(Entity::project).collect());
        }

        debug!(kind = %E::KIND, key = %key, "Cache miss");

        let entities = self.store.find_all().await?;
        self.populate("read_all", &key, &entities).await?;
        Ok(entities.iter().map(Entity::project).collect())
    }

    /// Reads every entity referencing `parent_id`, in canonical order.
    ///
    /// An empty group is `NotFound` and is not cached.
    pub async fn read_by_parent(
        &self,
        parent_id: &EntityId,
    ) -> Result<Vec<E::Response>, DomainError> {
        let (link, key) = match (E::PARENT, self.keys.parent_group(parent_id)) {
            (Some(link), Some(key)) => (link, key),
            _ => {
                return Err(DomainError::validation(format!(
                    "{} has no parent reference",
                    E::KIND
                )));
            }
        };

        if let Some(entities) = self.cached::<Vec<E>>("read_by_parent", &key).await? {
            debug!(kind = %E::KIND, key = %key, count = entities.len(), "Cache hit");
            return Ok(entities.iter().map(Entity::project).collect());
        }

        debug!(kind = %E::KIND, key = %key, "Cache miss");

        let value = serde_json::Value::String(parent_id.to_string());
        let mut entities = self.store.find_by_field(link.field, &value).await?;

        if entities.is_empty() {
            return Err(DomainError::not_found(format!(
                "No {} found for {} {}",
                E::KIND,
                link.kind,
                parent_id
            )));
        }

        sort_canonical(&mut entities);
        self.populate("read_by_parent", &key, &entities).await?;
        Ok(entities.iter().map(Entity::project).collect())
    }

    /// Creates an entity, then refreshes the kind's views
    pub async fn create(&self, draft: E::Draft) -> Result<E::Response, DomainError> {
        let entity = self.store.create(draft).await.inspect_err(|e| {
            error!(kind = %E::KIND, operation = "create", error = %e, "Store mutation failed");
        })?;

        info!(kind = %E::KIND, id = %entity.id(), "Entity created");

        self.refresh().await?;
        Ok(entity.project())
    }

    /// Applies a patch, then refreshes the kind's views
    pub async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<E::Response, DomainError> {
        let entity = self
            .store
            .update(id, patch)
            .await
            .inspect_err(|e| {
                error!(kind = %E::KIND, id = %id, operation = "update", error = %e, "Store mutation failed");
            })?
            .ok_or_else(|| DomainError::not_found(format!("{} {} not found", E::KIND, id)))?;

        info!(kind = %E::KIND, id = %id, "Entity updated");

        self.refresh().await?;
        Ok(entity.project())
    }

    /// Deletes an entity and evicts its own key, then refreshes the kind's views.
    ///
    /// The sweep runs even when the eviction failed; both failures are reported.
    pub async fn delete(&self, id: &EntityId) -> Result<E::Response, DomainError> {
        let removed = self
            .store
            .delete(id)
            .await
            .inspect_err(|e| {
                error!(kind = %E::KIND, id = %id, operation = "delete", error = %e, "Store mutation failed");
            })?
            .ok_or_else(|| DomainError::not_found(format!("{} {} not found", E::KIND, id)))?;

        info!(kind = %E::KIND, id = %id, "Entity deleted");

        let key = self.keys.entity(id);
        let evicted = self
            .cache
            .delete(&key)
            .await
            .map_err(|e| self.cache_failure("delete", &key, e));
        let swept = self.refresh().await;

        match (evicted, swept) {
            (Ok(_), Ok(_)) => Ok(removed.project()),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(evict), Err(sweep)) => Err(DomainError::internal(format!(
                "{}; {}",
                evict, sweep
            ))),
        }
    }

    /// Drops every cached view of this kind
    pub async fn flush(&self) -> Result<usize, DomainError> {
        let pattern = self.keys.namespace_pattern();
        let deleted = self
            .cache
            .delete_pattern(&pattern)
            .await
            .map_err(|e| self.cache_failure("flush", &pattern, e))?;

        info!(kind = %E::KIND, deleted, "Cache flushed");
        Ok(deleted)
    }

    async fn cached<V>(&self, operation: &str, key: &str) -> Result<Option<V>, DomainError>
    where
        V: DeserializeOwned + Send,
    {
        self.cache
            .as_ref()
            .get(key)
            .await
            .map_err(|e| self.cache_failure(operation, key, e))
    }

    async fn populate<V>(&self, operation: &str, key: &str, value: &V) -> Result<(), DomainError>
    where
        V: Serialize + Send + Sync + ?Sized,
    {
        self.cache
            .as_ref()
            .set(key, value)
            .await
            .map_err(|e| self.cache_failure(operation, key, e))
    }

    /// Converts a cache adapter failure into `Internal` with context
    pub(super) fn cache_failure(&self, operation: &str, key: &str, e: DomainError) -> DomainError {
        error!(kind = %E::KIND, operation, key, error = %e, "Cache operation failed");
        DomainError::internal(format!(
            "{} {} failed on cache key '{}': {}",
            E::KIND,
            operation,
            key,
            e
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::step::{Step, StepDraft};
    use crate::domain::storage::mock::{MockStore, StoreOperation};
    use crate::domain::travel::{Travel, TravelDraft, TravelPatch};
    use crate::domain::user::{User, UserDraft};
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::storage::InMemoryStore;
    use chrono::{TimeZone, Utc};

    fn id(value: &str) -> EntityId {
        EntityId::new(value).unwrap()
    }

    fn travel(travel_id: &str, user_id: &str, title: &str) -> Travel {
        Travel::from_draft(
            id(travel_id),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            TravelDraft::new(id(user_id), title),
        )
    }

    fn mock_repo(
        store: MockStore<Travel>,
    ) -> (CachedRepository<Travel>, Arc<MockStore<Travel>>, Arc<MockCache>) {
        let store = Arc::new(store);
        let cache = Arc::new(MockCache::new());
        let repo: CachedRepository<Travel> = CachedRepository::new(store.clone(), cache.clone());
        (repo, store, cache)
    }

    fn in_memory<E: Entity>(cache: Arc<dyn Cache>) -> CachedRepository<E> {
        CachedRepository::new(Arc::new(InMemoryStore::<E>::new()), cache)
    }

    #[tokio::test]
    async fn test_read_miss_populates_raw_entity() {
        let t1 = travel("T1", "U1", "Trip");
        let (repo, _, cache) = mock_repo(MockStore::new().with_entity(t1.clone()));

        let response = repo.read(&id("T1")).await.unwrap();
        assert_eq!(response, t1.project());

        let cached: Travel =
            serde_json::from_str(&cache.snapshot()["travel:T1"]).unwrap();
        assert_eq!(cached, t1);
    }

    #[tokio::test]
    async fn test_read_hit_skips_store() {
        let t1 = travel("T1", "U1", "Trip");
        let store = MockStore::new()
            .with_entity(t1.clone())
            .failing(StoreOperation::FindById, "store down");
        let store = Arc::new(store);
        let cache = Arc::new(MockCache::new().with_entry("travel:T1", &t1));
        let repo: CachedRepository<Travel> = CachedRepository::new(store, cache);

        assert_eq!(repo.read(&id("T1")).await.unwrap(), t1.project());
    }

    #[tokio::test]
    async fn test_read_through_matches_store_projection() {
        let (repo, store, _) = mock_repo(
            MockStore::new()
                .with_entity(travel("T1", "U1", "Trip"))
                .with_entity(travel("T2", "U2", "Other")),
        );

        let first = repo.read(&id("T2")).await.unwrap();
        let second = repo.read(&id("T2")).await.unwrap();
        let expected = store.snapshot()[1].project();

        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found_and_not_cached() {
        let (repo, _, cache) = mock_repo(MockStore::new());

        let result = repo.read(&id("T404")).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(cache.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_read_cache_failure_is_internal() {
        let store = Arc::new(MockStore::new().with_entity(travel("T1", "U1", "Trip")));
        let cache = Arc::new(MockCache::new().with_error("connection refused"));
        let repo: CachedRepository<Travel> = CachedRepository::new(store, cache);

        let result = repo.read(&id("T1")).await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_undecodable_cache_value_is_internal() {
        let store = Arc::new(MockStore::<Travel>::new());
        let cache = Arc::new(MockCache::new().with_entry("travel:T1", &"not a travel"));
        let repo: CachedRepository<Travel> = CachedRepository::new(store, cache);

        let result = repo.read(&id("T1")).await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_read_all_populates_collection_key() {
        let (repo, _, cache) = mock_repo(
            MockStore::new()
                .with_entity(travel("T1", "U1", "A"))
                .with_entity(travel("T2", "U1", "B")),
        );

        let all = repo.read_all().await.unwrap();

        assert_eq!(all.len(), 2);
        assert!(cache.snapshot().contains_key("travel:all"));
    }

    #[tokio::test]
    async fn test_read_all_empty_collection_is_ok() {
        let (repo, _, _) = mock_repo(MockStore::new());
        assert!(repo.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_by_parent_filters_and_caches() {
        let (repo, _, cache) = mock_repo(
            MockStore::new()
                .with_entity(travel("T1", "U1", "A"))
                .with_entity(travel("T2", "U2", "B"))
                .with_entity(travel("T3", "U1", "C")),
        );

        let listed = repo.read_by_parent(&id("U1")).await.unwrap();

        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|t| t.user_id == id("U1")));
        assert!(cache.snapshot().contains_key("travel:user:U1"));
    }

    #[tokio::test]
    async fn test_read_by_parent_empty_is_not_found() {
        let (repo, _, cache) = mock_repo(MockStore::new().with_entity(travel("T1", "U1", "A")));

        let result = repo.read_by_parent(&id("U9")).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(!cache.snapshot().contains_key("travel:user:U9"));
    }

    #[tokio::test]
    async fn test_read_by_parent_on_parentless_kind_is_validation() {
        let repo: CachedRepository<User> = in_memory(Arc::new(MockCache::new()));

        let result = repo.read_by_parent(&id("X")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_read_by_parent_orders_steps_by_start_date() {
        let repo: CachedRepository<Step> = in_memory(Arc::new(MockCache::new()));
        let day = |d| Utc.with_ymd_and_hms(2024, 5, d, 9, 0, 0).unwrap();

        // Written straight to the store so the sweep does not pre-populate the group
        for (title, d) in [("Third", 3), ("First", 1), ("Second", 2)] {
            repo.store()
                .create(StepDraft::new(id("T1"), "visit", title, "Rome").starting_at(day(d)))
                .await
                .unwrap();
        }

        let titles: Vec<String> = repo
            .read_by_parent(&id("T1"))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();

        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_write_then_read_is_consistent() {
        let repo: CachedRepository<Travel> = in_memory(Arc::new(MockCache::new()));

        let created = repo
            .create(TravelDraft::new(id("U1"), "Trip"))
            .await
            .unwrap();

        // Warm every view, then mutate
        repo.read(&created.id).await.unwrap();
        repo.read_all().await.unwrap();
        repo.read_by_parent(&id("U1")).await.unwrap();

        let updated = repo
            .update(&created.id, TravelPatch::default().with_title("Trip v2"))
            .await
            .unwrap();

        assert_eq!(repo.read(&created.id).await.unwrap(), updated);
        assert_eq!(repo.read_all().await.unwrap(), vec![updated.clone()]);
        assert_eq!(repo.read_by_parent(&id("U1")).await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn test_delete_visibility() {
        let repo: CachedRepository<Travel> = in_memory(Arc::new(MockCache::new()));

        let a = repo.create(TravelDraft::new(id("U1"), "A")).await.unwrap();
        let b = repo.create(TravelDraft::new(id("U1"), "B")).await.unwrap();
        repo.read(&a.id).await.unwrap();

        let removed = repo.delete(&a.id).await.unwrap();
        assert_eq!(removed, a);

        assert!(matches!(
            repo.read(&a.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert_eq!(repo.read_all().await.unwrap(), vec![b.clone()]);
        assert_eq!(repo.read_by_parent(&id("U1")).await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found_without_sweep() {
        let (repo, _, cache) = mock_repo(MockStore::new());

        let updated = repo.update(&id("T1"), TravelPatch::default()).await;
        let deleted = repo.delete(&id("T1")).await;

        assert!(matches!(updated, Err(DomainError::NotFound { .. })));
        assert!(matches!(deleted, Err(DomainError::NotFound { .. })));
        assert!(cache.attempted_writes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_store_mutation_leaves_cache_untouched() {
        let t1 = travel("T1", "U1", "Trip");
        let store = MockStore::new()
            .with_entity(t1.clone())
            .failing(StoreOperation::Create, "disk full")
            .failing(StoreOperation::Update, "disk full")
            .failing(StoreOperation::Delete, "disk full");
        let (repo, _, cache) = mock_repo(store);

        repo.read(&id("T1")).await.unwrap();
        let before = cache.snapshot();

        let created = repo.create(TravelDraft::new(id("U1"), "New")).await;
        let updated = repo
            .update(&id("T1"), TravelPatch::default().with_title("Changed"))
            .await;
        let deleted = repo.delete(&id("T1")).await;

        assert!(matches!(created, Err(DomainError::Storage { .. })));
        assert!(matches!(updated, Err(DomainError::Storage { .. })));
        assert!(matches!(deleted, Err(DomainError::Storage { .. })));
        assert_eq!(cache.snapshot(), before);
        assert_eq!(cache.attempted_writes(), vec!["travel:T1".to_string()]);
    }

    #[tokio::test]
    async fn test_sweep_failure_is_internal_and_mutation_is_durable() {
        let (repo, store, cache) = mock_repo(MockStore::new());
        cache.set_error(Some("cache unreachable".to_string()));

        let result = repo.create(TravelDraft::new(id("U1"), "Trip")).await;

        assert!(matches!(result, Err(DomainError::Internal { .. })));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_eviction_failure_still_sweeps() {
        let (repo, _, cache) = mock_repo(
            MockStore::new()
                .with_entity(travel("T1", "U1", "A"))
                .with_entity(travel("T2", "U1", "B")),
        );
        cache.fail_writes_to("travel:T1");

        let result = repo.delete(&id("T1")).await;

        assert!(matches!(result, Err(DomainError::Internal { .. })));
        let snapshot = cache.snapshot();
        assert!(snapshot.contains_key("travel:all"));
        assert!(snapshot.contains_key("travel:T2"));
        assert!(snapshot.contains_key("travel:user:U1"));
    }

    #[tokio::test]
    async fn test_flush_drops_only_own_namespace() {
        let cache = Arc::new(MockCache::new());
        let travels: CachedRepository<Travel> = in_memory(cache.clone());
        let users: CachedRepository<User> = in_memory(cache.clone());

        travels.create(TravelDraft::new(id("U1"), "A")).await.unwrap();
        users
            .create(UserDraft::new("Ada", "ada@example.com", "hash"))
            .await
            .unwrap();

        let deleted = travels.flush().await.unwrap();

        assert_eq!(deleted, 3);
        assert!(cache.snapshot().keys().all(|k| k.starts_with("user:")));
    }

    #[tokio::test]
    async fn test_works_over_moka_cache() {
        let repo: CachedRepository<Travel> = in_memory(Arc::new(InMemoryCache::new()));

        let created = repo.create(TravelDraft::new(id("U1"), "Trip")).await.unwrap();

        assert_eq!(repo.read(&created.id).await.unwrap(), created);
        assert_eq!(repo.read_by_parent(&id("U1")).await.unwrap(), vec![created]);
    }
}
