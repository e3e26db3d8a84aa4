//! Check command - shows the resolved backends and tests connectivity

use anyhow::Context;

use crate::infrastructure::cache::CacheFactory;
use crate::infrastructure::repository::Repositories;
use crate::infrastructure::storage::StorageFactory;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    println!("logging: level={} format={:?}", config.logging.level, config.logging.format);

    let cache = CacheFactory::new()
        .create(&config.cache)
        .await
        .with_context(|| format!("cache ({}) unreachable", config.cache.cache_type))?;
    let entries = cache.size().await.context("cache size query failed")?;
    println!("cache: {} ok, {} entries", config.cache.cache_type, entries);

    let backend = StorageFactory::connect(&config.storage)
        .await
        .with_context(|| format!("storage ({}) unreachable", config.storage.storage_type))?;
    Repositories::build(&backend, cache)
        .await
        .context("storage tables could not be provisioned")?;
    println!("storage: {} ok", backend.storage_type());

    Ok(())
}
