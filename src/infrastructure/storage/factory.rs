//! Store factory for runtime backend selection

use std::sync::Arc;

use serde::Deserialize;
use sqlx::postgres::PgPool;

use crate::domain::storage::{Entity, EntityStore};
use crate::domain::DomainError;

use super::in_memory::InMemoryStore;
use super::postgres::{connect_pool, PostgresConfig, PostgresStore};

/// Supported store backends
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// In-memory store (for testing/development)
    #[default]
    #[serde(alias = "memory", alias = "inmemory")]
    InMemory,
    /// PostgreSQL store
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::InMemory => write!(f, "in_memory"),
            StorageType::Postgres => write!(f, "postgres"),
        }
    }
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage type: {}. Valid types: in_memory, postgres",
                s
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub storage_type: StorageType,
    /// Used when `storage_type` is `postgres`
    pub postgres: PostgresConfig,
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self {
            storage_type: StorageType::Postgres,
            postgres: config,
        }
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::postgres(PostgresConfig::new(url))
    }
}

/// A connected backend that hands out one store per entity kind.
///
/// PostgreSQL stores of every kind share a single pool.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    Postgres(PgPool),
}

impl StorageBackend {
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }

    /// Creates the store for kind `E`, provisioning its table when needed
    pub async fn store<E>(&self) -> Result<Arc<dyn EntityStore<E>>, DomainError>
    where
        E: Entity,
    {
        match self {
            Self::InMemory => Ok(Arc::new(InMemoryStore::<E>::new())),
            Self::Postgres(pool) => {
                let store = PostgresStore::<E>::new(pool.clone());
                store.ensure_table().await?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Factory for connecting store backends
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Connects the backend selected by the configuration
    pub async fn connect(config: &StorageConfig) -> Result<StorageBackend, DomainError> {
        match config.storage_type {
            StorageType::InMemory => Ok(StorageBackend::InMemory),
            StorageType::Postgres => {
                let pool = connect_pool(&config.postgres).await?;
                Ok(StorageBackend::Postgres(pool))
            }
        }
    }

    /// Connects and creates a single store in one step
    pub async fn create<E>(config: &StorageConfig) -> Result<Arc<dyn EntityStore<E>>, DomainError>
    where
        E: Entity,
    {
        Self::connect(config).await?.store::<E>().await
    }
}
