//! Replication mode of a facade, fixed when it is constructed

use std::fmt;
use treecache_config::CacheMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterMode {
    /// No replication or cross-process coordination
    Local,
    /// Data is replicated or invalidated across cluster members
    Clustered,
}

impl ClusterMode {
    pub fn is_local(self) -> bool {
        self == ClusterMode::Local
    }
}

impl From<CacheMode> for ClusterMode {
    fn from(mode: CacheMode) -> Self {
        if mode.is_clustered() {
            ClusterMode::Clustered
        } else {
            ClusterMode::Local
        }
    }
}

impl fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterMode::Local => f.write_str("local"),
            ClusterMode::Clustered => f.write_str("clustered"),
        }
    }
}
