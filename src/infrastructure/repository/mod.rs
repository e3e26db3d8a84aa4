//! Cache-coherent repositories
//!
//! [`CachedRepository`] serves three read views per entity kind (by id, by
//! parent, full collection) from the cache and rebuilds all of them after
//! every successful write.

mod cached;
mod preference;
mod registry;
mod subscription;
mod sweep;

pub use cached::CachedRepository;
pub use registry::Repositories;
pub use sweep::SweepReport;
