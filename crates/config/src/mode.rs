//! Clustering modes a cache can be configured with

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use treecache_core::{Error, Result};

/// How a cache shares its content with other nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// No replication or cross-process coordination
    #[default]
    Local,
    /// Every write is copied to all members before returning
    ReplSync,
    /// Every write is copied to all members in the background
    ReplAsync,
    /// Writes evict the key on other members
    InvalidationSync,
    InvalidationAsync,
    /// Writes are copied to the owners of the key
    DistSync,
    DistAsync,
}

impl CacheMode {
    /// Whether the mode involves any other node at all
    pub fn is_clustered(self) -> bool {
        self != CacheMode::Local
    }

    pub fn is_synchronous(self) -> bool {
        matches!(
            self,
            CacheMode::Local
                | CacheMode::ReplSync
                | CacheMode::InvalidationSync
                | CacheMode::DistSync
        )
    }

    /// Whether writes carry their value to other members
    pub fn is_replicated(self) -> bool {
        matches!(
            self,
            CacheMode::ReplSync | CacheMode::ReplAsync | CacheMode::DistSync | CacheMode::DistAsync
        )
    }

    pub fn is_invalidation(self) -> bool {
        matches!(
            self,
            CacheMode::InvalidationSync | CacheMode::InvalidationAsync
        )
    }

    fn as_str(self) -> &'static str {
        match self {
            CacheMode::Local => "local",
            CacheMode::ReplSync => "repl-sync",
            CacheMode::ReplAsync => "repl-async",
            CacheMode::InvalidationSync => "invalidation-sync",
            CacheMode::InvalidationAsync => "invalidation-async",
            CacheMode::DistSync => "dist-sync",
            CacheMode::DistAsync => "dist-async",
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheMode {
    type Err = Error;

    /// Accepts `repl-sync`, `repl_sync` and `REPL_SYNC` alike
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "local" => Ok(CacheMode::Local),
            "repl-sync" => Ok(CacheMode::ReplSync),
            "repl-async" => Ok(CacheMode::ReplAsync),
            "invalidation-sync" => Ok(CacheMode::InvalidationSync),
            "invalidation-async" => Ok(CacheMode::InvalidationAsync),
            "dist-sync" => Ok(CacheMode::DistSync),
            "dist-async" => Ok(CacheMode::DistAsync),
            _ => Err(Error::configuration(format!("unknown cache mode '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_classification() {
        assert!(!CacheMode::Local.is_clustered());
        assert!(CacheMode::ReplAsync.is_clustered());
        assert!(CacheMode::DistSync.is_replicated());
        assert!(!CacheMode::InvalidationSync.is_replicated());
        assert!(CacheMode::InvalidationAsync.is_invalidation());
        assert!(!CacheMode::ReplAsync.is_synchronous());
    }

    #[test]
    fn test_mode_text_forms() {
        assert_eq!("repl-sync".parse::<CacheMode>().unwrap(), CacheMode::ReplSync);
        assert_eq!("REPL_ASYNC".parse::<CacheMode>().unwrap(), CacheMode::ReplAsync);
        assert_eq!(" local ".parse::<CacheMode>().unwrap(), CacheMode::Local);
        assert!("replicated".parse::<CacheMode>().is_err());

        assert_eq!(CacheMode::InvalidationSync.to_string(), "invalidation-sync");
        assert_eq!(
            serde_json::to_string(&CacheMode::DistAsync).unwrap(),
            "\"dist-async\""
        );
    }
}
