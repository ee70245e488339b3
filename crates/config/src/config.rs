//! Configuration objects for caches and their container
//!
//! A container is described by one [`GlobalConfiguration`] (cluster identity)
//! and a set of [`CacheConfiguration`]s: one for the default cache plus any
//! number of named ones. All of them are plain values that can be built in
//! code with the builders below or read from a file by the
//! [`ConfigLoader`](crate::ConfigLoader).

use crate::mode::CacheMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use treecache_core::{Error, Result, DEFAULT_CACHE_NAME, DEFAULT_CLUSTER_NAME};

/// Clustering section of a cache configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusteringConfiguration {
    #[serde(default)]
    pub mode: CacheMode,
}

/// Configuration for a single cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfiguration {
    #[serde(default)]
    pub clustering: ClusteringConfiguration,
    /// Record hit/miss/write counters
    #[serde(default)]
    pub statistics: bool,
}

impl CacheConfiguration {
    pub fn builder() -> CacheConfigurationBuilder {
        CacheConfigurationBuilder::new()
    }

    /// Shorthand for the clustering mode
    pub fn mode(&self) -> CacheMode {
        self.clustering.mode
    }
}

/// Builder for [`CacheConfiguration`]
#[derive(Debug, Default)]
pub struct CacheConfigurationBuilder {
    config: CacheConfiguration,
}

impl CacheConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clustering mode
    pub fn with_mode(mut self, mode: CacheMode) -> Self {
        self.config.clustering.mode = mode;
        self
    }

    /// Enable or disable statistics
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.config.statistics = enabled;
        self
    }

    pub fn build(self) -> CacheConfiguration {
        self.config
    }
}

/// Container-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfiguration {
    /// Caches only replicate to members of the same cluster
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,
    /// Identity of this node inside the cluster
    #[serde(default = "generate_node_name")]
    pub node_name: String,
    /// Name under which the default cache is registered
    #[serde(default = "default_cache_name")]
    pub default_cache: String,
}

impl Default for GlobalConfiguration {
    fn default() -> Self {
        Self {
            cluster_name: default_cluster_name(),
            node_name: generate_node_name(),
            default_cache: default_cache_name(),
        }
    }
}

impl GlobalConfiguration {
    pub fn builder() -> GlobalConfigurationBuilder {
        GlobalConfigurationBuilder::new()
    }

    /// Check that every identity field is usable
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(Error::configuration("cluster name cannot be empty"));
        }
        if self.node_name.trim().is_empty() {
            return Err(Error::configuration("node name cannot be empty"));
        }
        if self.default_cache.trim().is_empty() {
            return Err(Error::configuration("default cache name cannot be empty"));
        }
        Ok(())
    }
}

/// Builder for [`GlobalConfiguration`]
#[derive(Debug, Default)]
pub struct GlobalConfigurationBuilder {
    config: GlobalConfiguration,
}

impl GlobalConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster_name(mut self, name: impl Into<String>) -> Self {
        self.config.cluster_name = name.into();
        self
    }

    pub fn with_node_name(mut self, name: impl Into<String>) -> Self {
        self.config.node_name = name.into();
        self
    }

    pub fn with_default_cache(mut self, name: impl Into<String>) -> Self {
        self.config.default_cache = name.into();
        self
    }

    pub fn build(self) -> GlobalConfiguration {
        self.config
    }
}

/// Everything needed to build a container: the on-disk configuration format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfiguration {
    #[serde(default)]
    pub global: GlobalConfiguration,
    #[serde(default)]
    pub default_cache: CacheConfiguration,
    /// Named caches, looked up before falling back to `default_cache`
    #[serde(default)]
    pub caches: HashMap<String, CacheConfiguration>,
    /// Where this configuration came from
    #[serde(skip)]
    pub source: ConfigSource,
}

impl ContainerConfiguration {
    pub fn new(global: GlobalConfiguration, default_cache: CacheConfiguration) -> Self {
        Self {
            global,
            default_cache,
            caches: HashMap::new(),
            source: ConfigSource::Default,
        }
    }

    /// Register a named cache configuration
    pub fn with_cache(mut self, name: impl Into<String>, config: CacheConfiguration) -> Self {
        self.caches.insert(name.into(), config);
        self
    }

    /// The configuration a cache called `name` is built with
    pub fn cache_configuration(&self, name: &str) -> &CacheConfiguration {
        if name == self.global.default_cache {
            return &self.default_cache;
        }
        self.caches.get(name).unwrap_or(&self.default_cache)
    }

    pub fn validate(&self) -> Result<()> {
        self.global.validate()?;
        if let Some(name) = self.caches.keys().find(|name| name.trim().is_empty()) {
            return Err(Error::configuration(format!(
                "cache name '{name}' cannot be blank"
            )));
        }
        Ok(())
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built in code
    #[default]
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// A file with environment variable overrides applied on top
    EnvironmentVariable(String),
}

fn default_cluster_name() -> String {
    DEFAULT_CLUSTER_NAME.to_string()
}

fn default_cache_name() -> String {
    DEFAULT_CACHE_NAME.to_string()
}

fn generate_node_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("node-{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_configuration_builder() {
        let config = CacheConfiguration::builder()
            .with_mode(CacheMode::ReplSync)
            .with_statistics(true)
            .build();

        assert_eq!(config.mode(), CacheMode::ReplSync);
        assert!(config.statistics);
        assert_eq!(CacheConfiguration::default().mode(), CacheMode::Local);
    }

    #[test]
    fn test_global_defaults() {
        let a = GlobalConfiguration::default();
        let b = GlobalConfiguration::default();

        assert_eq!(a.cluster_name, DEFAULT_CLUSTER_NAME);
        assert_eq!(a.default_cache, DEFAULT_CACHE_NAME);
        assert!(a.node_name.starts_with("node-"));
        assert_eq!(a.node_name.len(), "node-".len() + 8);
        assert_ne!(a.node_name, b.node_name);
    }

    #[test]
    fn test_global_validation() {
        let config = GlobalConfiguration::builder()
            .with_cluster_name(" ")
            .build();
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));

        let config = GlobalConfiguration::builder()
            .with_cluster_name("sip")
            .with_node_name("n1")
            .build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_named_cache_lookup() {
        let repl = CacheConfiguration::builder()
            .with_mode(CacheMode::ReplAsync)
            .build();
        let container =
            ContainerConfiguration::new(GlobalConfiguration::default(), CacheConfiguration::default())
                .with_cache("sessions", repl.clone());

        assert_eq!(container.cache_configuration("sessions"), &repl);
        assert_eq!(container.cache_configuration("unknown").mode(), CacheMode::Local);
        assert_eq!(
            container.cache_configuration(DEFAULT_CACHE_NAME).mode(),
            CacheMode::Local
        );
    }

    #[test]
    fn test_container_deserializes_with_defaults() {
        let container: ContainerConfiguration = serde_json::from_str(
            r#"{
                "global": { "cluster_name": "sip", "node_name": "n1" },
                "default_cache": { "clustering": { "mode": "repl-sync" } }
            }"#,
        )
        .unwrap();

        assert_eq!(container.global.cluster_name, "sip");
        assert_eq!(container.global.default_cache, DEFAULT_CACHE_NAME);
        assert_eq!(container.default_cache.mode(), CacheMode::ReplSync);
        assert!(!container.default_cache.statistics);
        assert!(container.caches.is_empty());
        assert_eq!(container.source, ConfigSource::Default);
    }
}
