//! Lifecycle-aware facade over a tree cache
//!
//! A [`CacheFacade`] resolves a container and a tree view from a
//! [`Bootstrap`] source, records the replication mode once, and starts and
//! stops the engine on behalf of its callers. It only ever stops a container
//! it built itself.

use crate::bootstrap::Bootstrap;
use crate::mode::ClusterMode;
use std::path::PathBuf;
use std::sync::Arc;
use treecache_config::{CacheConfiguration, CacheMode, GlobalConfiguration};
use treecache_core::{Error, Fqn, Result};
use treecache_engine::{Cache, CacheManager, ClassContext, TreeCache};

pub struct CacheFacade {
    container: CacheManager,
    tree: TreeCache,
    mode: ClusterMode,
    cache_mode: CacheMode,
    managed_externally: bool,
}

impl CacheFacade {
    /// Build a facade from any bootstrap source.
    ///
    /// Every failure while resolving the container or its cache is reported
    /// as [`Error::Bootstrap`]; no facade exists afterwards.
    pub fn bootstrap(source: Bootstrap) -> Result<Self> {
        let kind = source.kind();
        let managed_externally = source.is_external();

        let (container, tree) = Self::resolve(source).map_err(|e| match e {
            Error::Bootstrap { .. } => e,
            other => Error::bootstrap_with_source(kind, other),
        })?;

        let cache_mode = tree.cache().mode();
        let mode = ClusterMode::from(cache_mode);
        tracing::debug!(
            source = kind,
            mode = %mode,
            cache_mode = %cache_mode,
            managed_externally,
            "Cache facade created"
        );

        Ok(Self {
            container,
            tree,
            mode,
            cache_mode,
            managed_externally,
        })
    }

    pub fn from_configuration(cache: CacheConfiguration, global: GlobalConfiguration) -> Result<Self> {
        Self::bootstrap(Bootstrap::Configuration {
            cache,
            global,
            context: None,
        })
    }

    pub fn from_configuration_with_context(
        cache: CacheConfiguration,
        global: GlobalConfiguration,
        context: Arc<dyn ClassContext>,
    ) -> Result<Self> {
        Self::bootstrap(Bootstrap::Configuration {
            cache,
            global,
            context: Some(context),
        })
    }

    pub fn from_file(location: impl Into<PathBuf>) -> Result<Self> {
        Self::bootstrap(Bootstrap::File {
            location: location.into(),
            context: None,
        })
    }

    pub fn from_file_with_context(
        location: impl Into<PathBuf>,
        context: Arc<dyn ClassContext>,
    ) -> Result<Self> {
        Self::bootstrap(Bootstrap::File {
            location: location.into(),
            context: Some(context),
        })
    }

    /// Facade over a container owned by the caller
    pub fn from_container(container: CacheManager) -> Result<Self> {
        Self::bootstrap(Bootstrap::Container(container))
    }

    /// Facade over a single cache owned by the caller
    pub fn from_cache(cache: Cache) -> Result<Self> {
        Self::bootstrap(Bootstrap::Cache(cache))
    }

    fn resolve(source: Bootstrap) -> Result<(CacheManager, TreeCache)> {
        match source {
            Bootstrap::Configuration {
                cache,
                global,
                context,
            } => {
                let container = CacheManager::new(global, cache, false)?;
                let tree = Self::tree_view(container.cache()?, context);
                Ok((container, tree))
            }
            Bootstrap::File { location, context } => {
                let container = CacheManager::from_file(&location, false)?;
                let tree = Self::tree_view(container.cache()?, context);
                Ok((container, tree))
            }
            Bootstrap::Container(container) => {
                let tree = TreeCache::new(container.cache()?);
                Ok((container, tree))
            }
            Bootstrap::Cache(cache) => {
                let container = cache.cache_manager()?;
                Ok((container, TreeCache::new(cache)))
            }
        }
    }

    /// Contexts only matter where values cross process boundaries
    fn tree_view(cache: Cache, context: Option<Arc<dyn ClassContext>>) -> TreeCache {
        match context {
            Some(context) if cache.mode().is_clustered() => {
                TreeCache::decorated(cache.with_context(context))
            }
            _ => TreeCache::new(cache),
        }
    }

    /// Start the underlying cache unless it is already running
    pub fn start(&self) -> Result<()> {
        let cache = self.tree.cache();
        if !cache.status().is_running() {
            tracing::info!(cache = %cache.name(), "Starting cache...");
            self.tree
                .start()
                .inspect_err(|e| tracing::warn!(error = %e, cache = %cache.name(), "Failed to start cache"))?;
        }
        tracing::info!(
            status = %cache.status(),
            mode = %self.cache_mode,
            "Cache started"
        );
        Ok(())
    }

    /// Stop the container if this facade built it; otherwise leave it running
    pub fn stop(&self) -> Result<()> {
        if !self.managed_externally {
            tracing::info!("Cache stopping...");
            self.container
                .stop()
                .inspect_err(|e| tracing::warn!(error = %e, "Failed to stop cache container"))?;
        }
        tracing::info!(
            managed_externally = self.managed_externally,
            "Cache stopped"
        );
        Ok(())
    }

    pub fn is_local_mode(&self) -> bool {
        self.mode.is_local()
    }

    pub fn mode(&self) -> ClusterMode {
        self.mode
    }

    /// Engine mode of the cache, as configured at construction
    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    pub fn is_managed_externally(&self) -> bool {
        self.managed_externally
    }

    pub fn container(&self) -> &CacheManager {
        &self.container
    }

    pub fn tree(&self) -> &TreeCache {
        &self.tree
    }

    /// Use `context` to read values stored under `fqn`.
    ///
    /// Ignored in local mode, where values are never marshalled.
    pub fn bind_region(&self, fqn: &Fqn, context: Arc<dyn ClassContext>) {
        if self.is_local_mode() {
            tracing::debug!(region = %fqn, "Ignoring region binding in local mode");
            return;
        }
        self.tree.cache().bind_region(fqn, context);
    }

    /// Remove the binding rooted exactly at `fqn`
    pub fn unbind_region(&self, fqn: &Fqn) -> bool {
        if self.is_local_mode() {
            return false;
        }
        self.tree.cache().unbind_region(fqn)
    }

    /// Bind `context` for the whole tree
    pub fn bind_default_region(&self, context: Arc<dyn ClassContext>) {
        self.bind_region(&Fqn::root(), context);
    }

    pub fn unbind_default_region(&self) -> bool {
        self.unbind_region(&Fqn::root())
    }

    /// Context a read under `fqn` resolves to
    pub fn context_for(&self, fqn: &Fqn) -> Arc<dyn ClassContext> {
        self.tree.resolve_context(fqn)
    }

    /// Printable dump of the whole tree
    pub fn cache_content(&self) -> Result<String> {
        let cache = self.tree.cache();
        Ok(format!(
            "Cache '{}' ({}, {}):\n{}",
            cache.name(),
            self.cache_mode,
            cache.status(),
            self.tree.print_details()?
        ))
    }
}

impl Drop for CacheFacade {
    fn drop(&mut self) {
        if self.managed_externally || !self.container.status().is_running() {
            return;
        }
        tracing::debug!("Stopping owned container on drop");
        if let Err(e) = self.container.stop() {
            tracing::warn!(error = %e, "Failed to stop owned container");
        }
    }
}

impl std::fmt::Debug for CacheFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFacade")
            .field("container", &self.container)
            .field("mode", &self.mode)
            .field("cache_mode", &self.cache_mode)
            .field("managed_externally", &self.managed_externally)
            .finish()
    }
}
