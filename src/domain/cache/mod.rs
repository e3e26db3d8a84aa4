//! Cache domain - Key-value cache abstraction and key layout

mod key;
mod repository;

pub use key::{glob_regex, CacheKeyspace};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
