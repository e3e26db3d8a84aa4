//! PostgreSQL store implementation with connection pooling

use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::domain::storage::{Entity, EntityStore};
use crate::domain::{DomainError, EntityId};

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/roadbook".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

/// Opens a connection pool shared by every per-kind store
pub async fn connect_pool(config: &PostgresConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
}

fn table_ddl(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            seq BIGSERIAL,
            id VARCHAR(128) PRIMARY KEY,
            data JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#
    )
}

fn unique_index_ddl(table: &str, field: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {table}_{field}_key ON {table} ((data->>'{field}'))"
    )
}

/// Maps a write failure, turning unique index violations into validation errors
fn write_error(kind: &str, operation: &str, error: sqlx::Error) -> DomainError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::validation(format!(
            "{} {} violates a unique constraint: {}",
            kind, operation, db
        )),
        _ => DomainError::storage(format!("Failed to {} {}: {}", operation, kind, error)),
    }
}

/// PostgreSQL store for one entity kind
///
/// Each kind gets its own table holding one JSONB document per row. Unique
/// fields are enforced with expression indexes over the document, and a
/// serial column preserves insertion order for `find_all`.
pub struct PostgresStore<E>
where
    E: Entity,
{
    pool: PgPool,
    table_name: String,
    _phantom: PhantomData<E>,
}

impl<E> Debug for PostgresStore<E>
where
    E: Entity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl<E> PostgresStore<E>
where
    E: Entity,
{
    /// Creates a store over the kind's default table
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, E::KIND.table_name())
    }

    pub fn with_table(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
            _phantom: PhantomData,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Ensures the table and its unique indexes exist
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(&table_ddl(&self.table_name))
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        for field in E::UNIQUE_FIELDS {
            sqlx::query(&unique_index_ddl(&self.table_name, field))
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to create unique index on {}: {}", field, e))
                })?;
        }

        Ok(())
    }

    fn decode(row: &PgRow) -> Result<E, DomainError> {
        let data: serde_json::Value = row.get("data");
        serde_json::from_value(data).map_err(|e| {
            DomainError::storage(format!("Failed to deserialize {}: {}", E::KIND, e))
        })
    }

    fn encode(entity: &E) -> Result<serde_json::Value, DomainError> {
        serde_json::to_value(entity)
            .map_err(|e| DomainError::storage(format!("Failed to serialize {}: {}", E::KIND, e)))
    }

    fn decode_all(rows: Vec<PgRow>) -> Result<Vec<E>, DomainError> {
        rows.iter().map(Self::decode).collect()
    }
}

#[async_trait]
impl<E> EntityStore<E> for PostgresStore<E>
where
    E: Entity,
{
    async fn create(&self, draft: E::Draft) -> Result<E, DomainError> {
        let entity = E::from_draft(EntityId::generate(), Utc::now(), draft);
        let data = Self::encode(&entity)?;

        let query = format!(
            "INSERT INTO {} (id, data, created_at) VALUES ($1, $2, $3)",
            self.table_name
        );

        sqlx::query(&query)
            .bind(entity.id().as_str())
            .bind(&data)
            .bind(entity.created_at())
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(E::KIND.namespace(), "create", e))?;

        Ok(entity)
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<E>, DomainError> {
        let query = format!("SELECT data FROM {} WHERE id = $1", self.table_name);

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get {} {}: {}", E::KIND, id, e)))?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn find_all(&self) -> Result<Vec<E>, DomainError> {
        let query = format!("SELECT data FROM {} ORDER BY seq", self.table_name);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list {}: {}", E::KIND, e)))?;

        Self::decode_all(rows)
    }

    async fn find_by_field(
        &self,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<E>, DomainError> {
        let query = format!(
            "SELECT data FROM {} WHERE data -> $1 = $2 ORDER BY seq",
            self.table_name
        );

        let rows = sqlx::query(&query)
            .bind(field)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to query {} by {}: {}", E::KIND, field, e))
            })?;

        Self::decode_all(rows)
    }

    async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<Option<E>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let select = format!(
            "SELECT data FROM {} WHERE id = $1 FOR UPDATE",
            self.table_name
        );

        let row = sqlx::query(&select)
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to lock {} {}: {}", E::KIND, id, e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut entity = Self::decode(&row)?;
        entity.apply_patch(patch, Utc::now());
        let data = Self::encode(&entity)?;

        let update = format!("UPDATE {} SET data = $2 WHERE id = $1", self.table_name);

        sqlx::query(&update)
            .bind(id.as_str())
            .bind(&data)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(E::KIND.namespace(), "update", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit update: {}", e)))?;

        Ok(Some(entity))
    }

    async fn delete(&self, id: &EntityId) -> Result<Option<E>, DomainError> {
        let query = format!(
            "DELETE FROM {} WHERE id = $1 RETURNING data",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to delete {} {}: {}", E::KIND, id, e))
            })?;

        row.as_ref().map(Self::decode).transpose()
    }
}
