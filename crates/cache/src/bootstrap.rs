//! The ways a [`CacheFacade`](crate::CacheFacade) can obtain its cache

use std::path::PathBuf;
use std::sync::Arc;
use treecache_config::{CacheConfiguration, GlobalConfiguration};
use treecache_engine::{Cache, CacheManager, ClassContext};

/// Source a facade is bootstrapped from.
///
/// `Configuration` and `File` build a new container that the facade owns.
/// `Container` and `Cache` borrow one that somebody else manages; the facade
/// never stops those.
#[derive(Debug, Clone)]
pub enum Bootstrap {
    /// Build a new container from configuration values
    Configuration {
        cache: CacheConfiguration,
        global: GlobalConfiguration,
        context: Option<Arc<dyn ClassContext>>,
    },
    /// Build a new container from a configuration file
    File {
        location: PathBuf,
        context: Option<Arc<dyn ClassContext>>,
    },
    /// Use an existing container and its default cache
    Container(CacheManager),
    /// Use an existing cache and the container that owns it
    Cache(Cache),
}

impl Bootstrap {
    /// Whether the facade built from this source borrows its container
    pub fn is_external(&self) -> bool {
        matches!(self, Bootstrap::Container(_) | Bootstrap::Cache(_))
    }

    /// Short name of the source, used in errors and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Bootstrap::Configuration { .. } => "configuration",
            Bootstrap::File { .. } => "configuration file",
            Bootstrap::Container(_) => "container",
            Bootstrap::Cache(_) => "cache",
        }
    }
}
