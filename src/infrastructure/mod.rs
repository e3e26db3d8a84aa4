//! Infrastructure layer - cache backends, store adapters and repositories

pub mod cache;
pub mod logging;
pub mod repository;
pub mod storage;
