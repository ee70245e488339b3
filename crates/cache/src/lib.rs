//! `treecache`: a lifecycle-aware facade over a hierarchical, replicable cache.
//!
//! ```no_run
//! use treecache::{CacheFacade, CacheConfiguration, GlobalConfiguration, fqn};
//!
//! # fn main() -> treecache::Result<()> {
//! let facade = CacheFacade::from_configuration(
//!     CacheConfiguration::default(),
//!     GlobalConfiguration::default(),
//! )?;
//! facade.start()?;
//! facade.tree().put(&fqn!["sessions", "s-1"], "user", "alice".to_string())?;
//! facade.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! The facade can own the container it was built from, or borrow one that
//! the caller manages (see [`Bootstrap`]). It never stops a borrowed one.

pub mod bootstrap;
pub mod facade;
pub mod mode;

pub use bootstrap::Bootstrap;
pub use facade::CacheFacade;
pub use mode::ClusterMode;

pub use treecache_config::{CacheConfiguration, CacheMode, GlobalConfiguration};
pub use treecache_core::{fqn, Element, Error, Fqn, Result};
pub use treecache_engine::{
    default_context, Cache, CacheManager, ClassContext, ComponentStatus, TreeCache, TypeRegistry,
};
