//! In-process, tree-structured cache engine
//!
//! The engine provides the container ([`CacheManager`]), the flat node store
//! ([`Cache`]) and the hierarchical view over it ([`TreeCache`]). Caches in a
//! clustered mode that share a cluster name replicate to each other within
//! the process.

mod cluster;

pub mod cache;
pub mod context;
pub mod manager;
pub mod marshal;
pub mod region;
pub mod status;
pub mod tree;

pub use cache::{Cache, CacheStatistics, DecoratedCache};
pub use cluster::members as cluster_members;
pub use context::{default_context, ClassContext, TypeRegistry};
pub use manager::CacheManager;
pub use marshal::{Entry, Marshalled};
pub use region::{Region, RegionManager};
pub use status::ComponentStatus;
pub use tree::TreeCache;
