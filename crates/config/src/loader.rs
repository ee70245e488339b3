//! Configuration loader for treecache containers
//!
//! Reads a JSON [`ContainerConfiguration`] from disk and applies environment
//! variable overrides on top of it. Environment values win over the file.

use crate::config::{ConfigSource, ContainerConfiguration};
use crate::mode::CacheMode;
use std::path::{Path, PathBuf};
use treecache_core::{
    Error, Result, ResultExt, CACHE_MODE_VAR, CLUSTER_NAME_VAR, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    NODE_NAME_VAR,
};

/// Configuration loader that handles file parsing and precedence
pub struct ConfigLoader {
    /// Whether `TREECACHE_*` variables may override file values
    apply_env: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { apply_env: true }
    }

    /// Ignore environment overrides, using only the file contents
    pub fn without_env_overrides(mut self) -> Self {
        self.apply_env = false;
        self
    }

    /// Load, override and validate the configuration at `path`
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ContainerConfiguration> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read config file", e))?;

        let mut config = Self::parse(&content)?;
        config.source = ConfigSource::ConfigFile(path.to_path_buf());

        if self.apply_env {
            Self::apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            cluster = %config.global.cluster_name,
            mode = %config.default_cache.mode(),
            "Loaded cache configuration"
        );
        Ok(config)
    }

    /// Parse configuration text without touching the file system
    pub fn parse(content: &str) -> Result<ContainerConfiguration> {
        serde_json::from_str(content).map_err(|e| Error::Json {
            message: "Failed to parse cache configuration".to_string(),
            source: e,
        })
    }

    /// Location used when no explicit configuration file is given
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config_home)
        } else {
            dirs::config_dir().ok_or_else(|| {
                Error::configuration(
                    "Could not determine config directory; set XDG_CONFIG_HOME or HOME",
                )
            })?
        };

        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    fn apply_env_overrides(config: &mut ContainerConfiguration) -> Result<()> {
        let mut applied = Vec::new();

        if let Ok(mode) = std::env::var(CACHE_MODE_VAR) {
            config.default_cache.clustering.mode = mode
                .parse::<CacheMode>()
                .with_context(|| format!("invalid {CACHE_MODE_VAR}"))?;
            applied.push(CACHE_MODE_VAR);
        }

        if let Ok(cluster) = std::env::var(CLUSTER_NAME_VAR) {
            config.global.cluster_name = cluster;
            applied.push(CLUSTER_NAME_VAR);
        }

        if let Ok(node) = std::env::var(NODE_NAME_VAR) {
            config.global.node_name = node;
            applied.push(NODE_NAME_VAR);
        }

        if !applied.is_empty() {
            tracing::debug!(variables = ?applied, "Applied environment overrides");
            config.source = ConfigSource::EnvironmentVariable(applied.join(","));
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const CLUSTERED: &str = r#"{
        "global": { "cluster_name": "sip-cluster", "node_name": "node-a" },
        "default_cache": { "clustering": { "mode": "repl-sync" }, "statistics": true },
        "caches": { "local-only": { "clustering": { "mode": "local" } } }
    }"#;

    fn clear_env() {
        std::env::remove_var(CACHE_MODE_VAR);
        std::env::remove_var(CLUSTER_NAME_VAR);
        std::env::remove_var(NODE_NAME_VAR);
    }

    #[test]
    #[serial]
    fn test_load_from_file() -> Result<()> {
        clear_env();
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cache.json");
        std::fs::write(&path, CLUSTERED)?;

        let config = ConfigLoader::new().load(&path)?;
        assert_eq!(config.global.cluster_name, "sip-cluster");
        assert_eq!(config.global.node_name, "node-a");
        assert_eq!(config.default_cache.mode(), CacheMode::ReplSync);
        assert!(config.default_cache.statistics);
        assert_eq!(
            config.cache_configuration("local-only").mode(),
            CacheMode::Local
        );
        assert_eq!(config.source, ConfigSource::ConfigFile(path));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() -> Result<()> {
        clear_env();
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cache.json");
        std::fs::write(&path, CLUSTERED)?;

        std::env::set_var(CACHE_MODE_VAR, "local");
        std::env::set_var(NODE_NAME_VAR, "node-b");
        let config = ConfigLoader::new().load(&path);
        let ignored = ConfigLoader::new().without_env_overrides().load(&path);
        clear_env();

        let config = config?;
        assert_eq!(config.default_cache.mode(), CacheMode::Local);
        assert_eq!(config.global.node_name, "node-b");
        assert_eq!(config.global.cluster_name, "sip-cluster");
        assert_eq!(
            config.source,
            ConfigSource::EnvironmentVariable(format!("{CACHE_MODE_VAR},{NODE_NAME_VAR}"))
        );

        assert_eq!(ignored?.default_cache.mode(), CacheMode::ReplSync);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_invalid_env_mode_is_rejected() -> Result<()> {
        clear_env();
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cache.json");
        std::fs::write(&path, CLUSTERED)?;

        std::env::set_var(CACHE_MODE_VAR, "broadcast");
        let result = ConfigLoader::new().load(&path);
        clear_env();

        assert!(matches!(result, Err(Error::Configuration { .. })));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new()
            .without_env_overrides()
            .load("/nonexistent/treecache/cache.json");
        match result {
            Err(Error::FileSystem { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/treecache/cache.json"))
            }
            other => panic!("expected FileSystem error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_content() {
        assert!(matches!(
            ConfigLoader::parse("{ \"global\": "),
            Err(Error::Json { .. })
        ));
        assert!(matches!(
            ConfigLoader::parse(r#"{ "default_cache": { "clustering": { "mode": "broadcast" } } }"#),
            Err(Error::Json { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_blank_cluster_name_fails_validation() -> Result<()> {
        clear_env();
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("cache.json");
        std::fs::write(&path, r#"{ "global": { "cluster_name": "" } }"#)?;

        assert!(matches!(
            ConfigLoader::new().load(&path),
            Err(Error::Configuration { .. })
        ));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_default_path_respects_xdg() {
        let previous = std::env::var("XDG_CONFIG_HOME").ok();
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdg-test");
        let path = ConfigLoader::default_path();
        match previous {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }

        assert_eq!(
            path.unwrap(),
            PathBuf::from("/tmp/xdg-test/treecache/cache.json")
        );
    }
}
