//! Wiring of one cache-coherent repository per entity kind

use std::sync::Arc;

use tracing::info;

use crate::domain::cache::Cache;
use crate::domain::preference::Preference;
use crate::domain::step::Step;
use crate::domain::storage::{Entity, EntityKind};
use crate::domain::subscription::Subscription;
use crate::domain::travel::Travel;
use crate::domain::user::User;
use crate::domain::DomainError;
use crate::infrastructure::cache::{CacheConfig, CacheFactory};
use crate::infrastructure::storage::{StorageBackend, StorageConfig, StorageFactory};

use super::cached::CachedRepository;
use super::sweep::SweepReport;

/// The repositories of every entity kind, sharing one cache and one backend
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: CachedRepository<User>,
    pub travels: CachedRepository<Travel>,
    pub steps: CachedRepository<Step>,
    pub subscriptions: CachedRepository<Subscription>,
    pub preferences: CachedRepository<Preference>,
}

async fn repository<E: Entity>(
    backend: &StorageBackend,
    cache: &Arc<dyn Cache>,
) -> Result<CachedRepository<E>, DomainError> {
    let store = backend.store::<E>().await?;
    Ok(CachedRepository::new(store, Arc::clone(cache)))
}

impl Repositories {
    /// Builds all repositories over an already connected cache and backend
    pub async fn build(
        backend: &StorageBackend,
        cache: Arc<dyn Cache>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            users: repository(backend, &cache).await?,
            travels: repository(backend, &cache).await?,
            steps: repository(backend, &cache).await?,
            subscriptions: repository(backend, &cache).await?,
            preferences: repository(backend, &cache).await?,
        })
    }

    /// Connects the configured cache and storage backends, then builds
    pub async fn connect(
        cache_config: &CacheConfig,
        storage_config: &StorageConfig,
    ) -> Result<Self, DomainError> {
        let cache = CacheFactory::new().create(cache_config).await?;
        let backend = StorageFactory::connect(storage_config).await?;

        info!(
            cache = %cache_config.cache_type,
            storage = %backend.storage_type(),
            "Repositories connected"
        );

        Self::build(&backend, cache).await
    }

    /// Runs the refresh sweep of one kind
    pub async fn refresh(&self, kind: EntityKind) -> Result<SweepReport, DomainError> {
        match kind {
            EntityKind::User => self.users.refresh().await,
            EntityKind::Travel => self.travels.refresh().await,
            EntityKind::Step => self.steps.refresh().await,
            EntityKind::Subscription => self.subscriptions.refresh().await,
            EntityKind::Preference => self.preferences.refresh().await,
        }
    }

    /// Drops the cached views of one kind
    pub async fn flush(&self, kind: EntityKind) -> Result<usize, DomainError> {
        match kind {
            EntityKind::User => self.users.flush().await,
            EntityKind::Travel => self.travels.flush().await,
            EntityKind::Step => self.steps.flush().await,
            EntityKind::Subscription => self.subscriptions.flush().await,
            EntityKind::Preference => self.preferences.flush().await,
        }
    }
}
