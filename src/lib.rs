//! Roadbook
//!
//! Persistence core of a multi-tenant travel planner (users, travels, steps,
//! subscriptions, preferences) with:
//! - Store adapters for an in-memory store and PostgreSQL JSONB tables
//! - In-memory (moka) and Redis caches
//! - Cache-coherent repositories that rebuild every cached view after each write

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use domain::DomainError;
use infrastructure::repository::Repositories;

/// Connects the configured backends and builds every repository
pub async fn build_repositories(config: &AppConfig) -> Result<Repositories, DomainError> {
    Repositories::connect(&config.cache, &config.storage).await
}
