//! Cache container
//!
//! A [`CacheManager`] owns the global configuration of one node and the named
//! caches created from it. Caches are created lazily on first request.

use crate::cache::Cache;
use crate::cluster;
use crate::status::ComponentStatus;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use treecache_config::{
    CacheConfiguration, ConfigLoader, ContainerConfiguration, GlobalConfiguration,
};
use treecache_core::{Error, Result};

const COMPONENT: &str = "cache manager";

/// Handle to a cache container; clones share the same container
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) inner: Arc<ManagerInner>,
}

pub(crate) struct ManagerInner {
    config: ContainerConfiguration,
    status: RwLock<ComponentStatus>,
    caches: Mutex<HashMap<String, Cache>>,
}

impl CacheManager {
    /// Container with a single default cache configuration
    pub fn new(
        global: GlobalConfiguration,
        default_cache: CacheConfiguration,
        start: bool,
    ) -> Result<Self> {
        Self::from_configuration(ContainerConfiguration::new(global, default_cache), start)
    }

    pub fn from_configuration(config: ContainerConfiguration, start: bool) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            cluster = %config.global.cluster_name,
            node = %config.global.node_name,
            source = ?config.source,
            "Creating cache manager"
        );

        let manager = Self {
            inner: Arc::new(ManagerInner {
                config,
                status: RwLock::new(ComponentStatus::Instantiated),
                caches: Mutex::new(HashMap::new()),
            }),
        };
        if start {
            manager.start()?;
        }
        Ok(manager)
    }

    /// Container described by the JSON configuration file at `path`
    pub fn from_file(path: impl AsRef<Path>, start: bool) -> Result<Self> {
        let config = ConfigLoader::new().load(path)?;
        Self::from_configuration(config, start)
    }

    pub fn status(&self) -> ComponentStatus {
        *self.inner.status.read()
    }

    pub fn global_configuration(&self) -> &GlobalConfiguration {
        &self.inner.config.global
    }

    pub fn configuration(&self) -> &ContainerConfiguration {
        &self.inner.config
    }

    /// The default cache
    pub fn cache(&self) -> Result<Cache> {
        let name = self.inner.config.global.default_cache.clone();
        self.get_cache(&name)
    }

    /// The cache called `name`, created on first use.
    ///
    /// A cache obtained from a running container is started before it is
    /// returned.
    pub fn get_cache(&self, name: &str) -> Result<Cache> {
        let status = self.status();
        if status == ComponentStatus::Failed {
            return Err(Error::illegal_state(COMPONENT, status, "get cache"));
        }

        let cache = {
            let mut caches = self.inner.caches.lock();
            caches
                .entry(name.to_string())
                .or_insert_with(|| {
                    let global = &self.inner.config.global;
                    Cache::new(
                        name,
                        self.inner.config.cache_configuration(name).clone(),
                        &global.cluster_name,
                        &global.node_name,
                        Arc::downgrade(&self.inner),
                    )
                })
                .clone()
        };

        if status.is_running() {
            cache.start()?;
        }
        Ok(cache)
    }

    /// Start the container and its default cache; a no-op when running
    pub fn start(&self) -> Result<()> {
        {
            let mut status = self.inner.status.write();
            if status.is_running() {
                return Ok(());
            }
            *status = ComponentStatus::Running;
        }

        let existing: Vec<Cache> = self.inner.caches.lock().values().cloned().collect();
        let started = existing
            .iter()
            .try_for_each(Cache::start)
            .and_then(|_| self.cache().map(|_| ()));
        if let Err(e) = started {
            *self.inner.status.write() = ComponentStatus::Failed;
            return Err(e);
        }

        tracing::info!(
            cluster = %self.inner.config.global.cluster_name,
            node = %self.inner.config.global.node_name,
            "Cache manager started"
        );
        Ok(())
    }

    /// Stop every cache and the container; a no-op unless running
    pub fn stop(&self) -> Result<()> {
        {
            let mut status = self.inner.status.write();
            if !status.is_running() {
                return Ok(());
            }
            *status = ComponentStatus::Stopping;
        }

        let caches: Vec<Cache> = self.inner.caches.lock().values().cloned().collect();
        for cache in &caches {
            cache.stop()?;
        }

        *self.inner.status.write() = ComponentStatus::Terminated;
        tracing::info!(node = %self.inner.config.global.node_name, "Cache manager stopped");
        Ok(())
    }

    /// Names of the caches created so far
    pub fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.caches.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Nodes currently in the cluster group of the cache called `name`
    pub fn cluster_members(&self, name: &str) -> Vec<String> {
        cluster::members(&self.inner.config.global.cluster_name, name)
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("cluster", &self.inner.config.global.cluster_name)
            .field("node", &self.inner.config.global.node_name)
            .field("status", &self.status())
            .field("caches", &self.cache_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treecache_config::CacheMode;

    fn local_manager(start: bool) -> CacheManager {
        CacheManager::new(
            GlobalConfiguration::default(),
            CacheConfiguration::default(),
            start,
        )
        .unwrap()
    }

    #[test]
    fn test_unstarted_manager_hands_out_unstarted_caches() {
        let manager = local_manager(false);
        assert_eq!(manager.status(), ComponentStatus::Instantiated);

        let cache = manager.cache().unwrap();
        assert_eq!(cache.status(), ComponentStatus::Instantiated);
        assert_eq!(manager.cache_names(), vec!["default".to_string()]);
    }

    #[test]
    fn test_start_and_stop_cascade_to_caches() {
        let manager = local_manager(true);
        let cache = manager.cache().unwrap();
        let other = manager.get_cache("sessions").unwrap();
        assert!(cache.status().is_running());
        assert!(other.status().is_running());

        manager.stop().unwrap();
        assert_eq!(manager.status(), ComponentStatus::Terminated);
        assert_eq!(cache.status(), ComponentStatus::Terminated);
        assert_eq!(other.status(), ComponentStatus::Terminated);

        manager.stop().unwrap();
        assert_eq!(cache.statistics().stops, 1);
    }

    #[test]
    fn test_starting_a_cache_starts_its_manager() {
        let manager = local_manager(false);
        manager.cache().unwrap().start().unwrap();
        assert!(manager.status().is_running());
    }

    #[test]
    fn test_restarting_one_cache_restarts_the_container() {
        let manager = local_manager(true);
        let cache = manager.cache().unwrap();
        let other = manager.get_cache("sessions").unwrap();
        manager.stop().unwrap();

        cache.start().unwrap();
        assert!(manager.status().is_running());
        assert!(cache.status().is_running());
        assert!(other.status().is_running());
        assert_eq!(other.statistics().starts, 2);
    }

    #[test]
    fn test_named_cache_uses_its_configuration() {
        let global = GlobalConfiguration::default();
        let config = ContainerConfiguration::new(global, CacheConfiguration::default()).with_cache(
            "replicated",
            CacheConfiguration::builder()
                .with_mode(CacheMode::ReplSync)
                .build(),
        );
        let manager = CacheManager::from_configuration(config, false).unwrap();

        assert_eq!(manager.cache().unwrap().mode(), CacheMode::Local);
        assert_eq!(
            manager.get_cache("replicated").unwrap().mode(),
            CacheMode::ReplSync
        );
    }

    #[test]
    fn test_cache_outlives_dropped_manager() {
        let cache = local_manager(false).cache().unwrap();
        assert!(matches!(cache.cache_manager(), Err(Error::Lifecycle { .. })));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(
            &path,
            r#"{"global": {"node_name": "file-node"}, "default_cache": {"statistics": true}}"#,
        )
        .unwrap();

        let manager = CacheManager::from_file(&path, false).unwrap();
        assert_eq!(manager.global_configuration().node_name, "file-node");
        assert!(manager.cache().unwrap().configuration().statistics);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CacheManager::from_file(dir.path().join("absent.json"), true);
        assert!(matches!(result, Err(Error::FileSystem { .. })));
    }
}
