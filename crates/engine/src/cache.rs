//! Flat node store underneath a [`TreeCache`](crate::TreeCache)
//!
//! A [`Cache`] maps each [`Fqn`] to the key/value entries of that node. It
//! owns its lifecycle status, its regions and, in clustered modes, its
//! membership in the in-process cluster.

use crate::cluster;
use crate::context::ClassContext;
use crate::manager::{CacheManager, ManagerInner};
use crate::marshal::Entry;
use crate::region::RegionManager;
use crate::status::ComponentStatus;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use treecache_config::{CacheConfiguration, CacheMode};
use treecache_core::{Error, Fqn, Result};

type NodeData = HashMap<String, Entry>;

/// Handle to one named cache of a [`CacheManager`]; clones share state
#[derive(Clone)]
pub struct Cache {
    pub(crate) inner: Arc<CacheInner>,
}

pub(crate) struct CacheInner {
    name: String,
    config: CacheConfiguration,
    cluster_name: String,
    node_name: String,
    status: RwLock<ComponentStatus>,
    nodes: DashMap<Fqn, NodeData>,
    regions: RegionManager,
    stats: StatsCounters,
    manager: Weak<ManagerInner>,
}

/// Snapshot of a cache's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    pub starts: u64,
    pub stops: u64,
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub removals: u64,
}

#[derive(Default)]
struct StatsCounters {
    starts: AtomicU64,
    stops: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    removals: AtomicU64,
}

/// A change shipped from one member of a group to the others
#[derive(Debug, Clone)]
enum RemoteOp {
    Put { fqn: Fqn, key: String, entry: Entry },
    Remove { fqn: Fqn, key: String },
    RemoveNode { fqn: Fqn },
}

/// A cache paired with the context its values should be read with
#[derive(Clone)]
pub struct DecoratedCache {
    cache: Cache,
    context: Arc<dyn ClassContext>,
}

impl DecoratedCache {
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn context(&self) -> &Arc<dyn ClassContext> {
        &self.context
    }
}

impl Cache {
    pub(crate) fn new(
        name: &str,
        config: CacheConfiguration,
        cluster_name: &str,
        node_name: &str,
        manager: Weak<ManagerInner>,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                name: name.to_string(),
                config,
                cluster_name: cluster_name.to_string(),
                node_name: node_name.to_string(),
                status: RwLock::new(ComponentStatus::Instantiated),
                nodes: DashMap::new(),
                regions: RegionManager::new(),
                stats: StatsCounters::default(),
                manager,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn configuration(&self) -> &CacheConfiguration {
        &self.inner.config
    }

    pub fn mode(&self) -> CacheMode {
        self.inner.config.clustering.mode
    }

    pub fn status(&self) -> ComponentStatus {
        *self.inner.status.read()
    }

    /// Name of this node inside its cluster
    pub fn node_name(&self) -> &str {
        &self.inner.node_name
    }

    /// The container this cache belongs to
    pub fn cache_manager(&self) -> Result<CacheManager> {
        self.inner
            .manager
            .upgrade()
            .map(|inner| CacheManager { inner })
            .ok_or_else(|| {
                Error::lifecycle(
                    &self.inner.name,
                    "resolve container",
                    "the owning container has been dropped",
                )
            })
    }

    /// View of this cache that reads values with `context`
    pub fn with_context(&self, context: Arc<dyn ClassContext>) -> DecoratedCache {
        DecoratedCache {
            cache: self.clone(),
            context,
        }
    }

    pub fn regions(&self) -> &RegionManager {
        &self.inner.regions
    }

    /// Bind `context` to the subtree at `fqn`, active at once if running
    pub fn bind_region(&self, fqn: &Fqn, context: Arc<dyn ClassContext>) {
        // Holding the status lock keeps start() from racing past the region
        let status = self.inner.status.read();
        self.inner.regions.bind(fqn, context, status.is_running());
    }

    /// Remove the region rooted exactly at `fqn`; false if there was none
    pub fn unbind_region(&self, fqn: &Fqn) -> bool {
        let _status = self.inner.status.read();
        self.inner.regions.unbind(fqn).is_some()
    }

    pub fn statistics(&self) -> CacheStatistics {
        let stats = &self.inner.stats;
        CacheStatistics {
            starts: stats.starts.load(Ordering::Relaxed),
            stops: stats.stops.load(Ordering::Relaxed),
            hits: stats.hits.load(Ordering::Relaxed),
            misses: stats.misses.load(Ordering::Relaxed),
            writes: stats.writes.load(Ordering::Relaxed),
            removals: stats.removals.load(Ordering::Relaxed),
        }
    }

    /// Start the cache; a no-op when it is already running.
    ///
    /// Starting a cache of a container that is not running starts the whole
    /// container, so every cache it holds comes back together.
    pub fn start(&self) -> Result<()> {
        if let Some(inner) = self.inner.manager.upgrade() {
            let manager = CacheManager { inner };
            if !manager.status().is_running() {
                manager.start()?;
            }
        }
        self.start_local()
    }

    fn start_local(&self) -> Result<()> {
        let mut status = self.inner.status.write();
        if !status.needs_start() {
            return Ok(());
        }

        *status = ComponentStatus::Initializing;
        if self.mode().is_clustered() {
            match cluster::join(
                &self.inner.cluster_name,
                &self.inner.name,
                &self.inner.node_name,
                &self.inner,
            ) {
                Ok(existing) => self.receive_state(&existing),
                Err(e) => {
                    *status = ComponentStatus::Failed;
                    return Err(e);
                }
            }
        }

        let activated = self.inner.regions.activate_all();
        *status = ComponentStatus::Running;
        self.inner.stats.starts.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            cache = %self.inner.name,
            node = %self.inner.node_name,
            mode = %self.mode(),
            regions_activated = activated,
            "Cache started"
        );
        Ok(())
    }

    /// Stop the cache, leaving its cluster and dropping its content
    pub fn stop(&self) -> Result<()> {
        let mut status = self.inner.status.write();
        if !status.is_running() {
            return Ok(());
        }

        *status = ComponentStatus::Stopping;
        if self.mode().is_clustered() {
            cluster::leave(
                &self.inner.cluster_name,
                &self.inner.name,
                &self.inner.node_name,
            );
        }
        self.inner.regions.deactivate_all();
        self.inner.nodes.clear();
        *status = ComponentStatus::Terminated;
        self.inner.stats.stops.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(cache = %self.inner.name, node = %self.inner.node_name, "Cache stopped");
        Ok(())
    }

    fn ensure_running(&self, operation: &'static str) -> Result<()> {
        let status = self.status();
        if status.is_running() {
            Ok(())
        } else {
            Err(Error::illegal_state(&self.inner.name, status, operation))
        }
    }

    fn count(&self, counter: &AtomicU64) {
        if self.inner.config.statistics {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn get_entry(&self, fqn: &Fqn, key: &str) -> Result<Option<Entry>> {
        self.ensure_running("read")?;
        let entry = self
            .inner
            .nodes
            .get(fqn)
            .and_then(|node| node.get(key).cloned());
        match entry {
            Some(_) => self.count(&self.inner.stats.hits),
            None => self.count(&self.inner.stats.misses),
        }
        Ok(entry)
    }

    pub(crate) fn put_entry(&self, fqn: &Fqn, key: &str, entry: Entry) -> Result<Option<Entry>> {
        self.ensure_running("write")?;
        let previous = self.insert_local(fqn, key, entry.clone());
        self.count(&self.inner.stats.writes);
        self.replicate(RemoteOp::Put {
            fqn: fqn.clone(),
            key: key.to_string(),
            entry,
        });
        Ok(previous)
    }

    pub(crate) fn remove_entry(&self, fqn: &Fqn, key: &str) -> Result<Option<Entry>> {
        self.ensure_running("remove")?;
        let removed = self
            .inner
            .nodes
            .get_mut(fqn)
            .and_then(|mut node| node.remove(key));
        if removed.is_some() {
            self.count(&self.inner.stats.removals);
        }
        // Peers may hold a key this member never had in invalidation modes
        if removed.is_some() || self.mode().is_invalidation() {
            self.replicate(RemoteOp::Remove {
                fqn: fqn.clone(),
                key: key.to_string(),
            });
        }
        Ok(removed)
    }

    pub(crate) fn keys(&self, fqn: &Fqn) -> Result<Vec<String>> {
        self.ensure_running("read")?;
        let mut keys: Vec<String> = self
            .inner
            .nodes
            .get(fqn)
            .map(|node| node.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    pub(crate) fn contains_node(&self, fqn: &Fqn) -> Result<bool> {
        self.ensure_running("read")?;
        Ok(fqn.is_root() || self.inner.nodes.contains_key(fqn))
    }

    pub(crate) fn remove_node(&self, fqn: &Fqn) -> Result<bool> {
        self.ensure_running("remove")?;
        let removed = self.remove_subtree(fqn);
        if removed {
            self.count(&self.inner.stats.removals);
        }
        if removed || self.mode().is_invalidation() {
            self.replicate(RemoteOp::RemoveNode { fqn: fqn.clone() });
        }
        Ok(removed)
    }

    pub(crate) fn children(&self, fqn: &Fqn) -> Result<Vec<Fqn>> {
        self.ensure_running("read")?;
        let mut children: Vec<Fqn> = self
            .inner
            .nodes
            .iter()
            .filter(|node| node.key().is_child_of(fqn))
            .map(|node| node.key().clone())
            .collect();
        children.sort();
        Ok(children)
    }

    /// Every node with its entries, in name order
    pub(crate) fn snapshot(&self) -> Result<Vec<(Fqn, Vec<(String, Entry)>)>> {
        self.ensure_running("read")?;
        let mut nodes: Vec<(Fqn, Vec<(String, Entry)>)> = self
            .inner
            .nodes
            .iter()
            .map(|node| {
                let mut entries: Vec<(String, Entry)> = node
                    .value()
                    .iter()
                    .map(|(key, entry)| (key.clone(), entry.clone()))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                (node.key().clone(), entries)
            })
            .collect();
        nodes.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(nodes)
    }

    fn insert_local(&self, fqn: &Fqn, key: &str, entry: Entry) -> Option<Entry> {
        for ancestor in fqn.ancestors().skip(1).filter(|a| !a.is_root()) {
            self.inner.nodes.entry(ancestor).or_default();
        }
        self.inner
            .nodes
            .entry(fqn.clone())
            .or_default()
            .insert(key.to_string(), entry)
    }

    fn remove_subtree(&self, fqn: &Fqn) -> bool {
        let before = self.inner.nodes.len();
        self.inner.nodes.retain(|name, _| !name.starts_with(fqn));
        before != self.inner.nodes.len()
    }

    fn replicate(&self, op: RemoteOp) {
        let mode = self.mode();
        if !mode.is_clustered() {
            return;
        }

        let op = match op {
            RemoteOp::Put { fqn, key, .. } if mode.is_invalidation() => RemoteOp::Remove { fqn, key },
            op => op,
        };
        for peer in cluster::peers(
            &self.inner.cluster_name,
            &self.inner.name,
            &self.inner.node_name,
        ) {
            Cache { inner: peer }.apply_remote(op.clone());
        }
    }

    fn apply_remote(&self, op: RemoteOp) {
        // A member that is still starting blocks here until its start
        // completes; one that is not running at all drops the change
        if !self.status().is_running() {
            return;
        }
        tracing::trace!(cache = %self.inner.name, node = %self.inner.node_name, ?op, "Applying remote change");
        match op {
            RemoteOp::Put { fqn, key, entry } => {
                self.insert_local(&fqn, &key, entry);
            }
            RemoteOp::Remove { fqn, key } => {
                if let Some(mut node) = self.inner.nodes.get_mut(&fqn) {
                    node.remove(&key);
                }
            }
            RemoteOp::RemoveNode { fqn } => {
                self.remove_subtree(&fqn);
            }
        }
    }

    /// Copy the content of the first running member, for replicated modes
    fn receive_state(&self, existing: &[Arc<CacheInner>]) {
        if !self.mode().is_replicated() {
            return;
        }
        let Some(source) = existing
            .iter()
            .find(|peer| peer.status.read().is_running())
        else {
            return;
        };
        for node in source.nodes.iter() {
            self.inner
                .nodes
                .insert(node.key().clone(), node.value().clone());
        }
        tracing::debug!(
            cache = %self.inner.name,
            from = %source.node_name,
            nodes = self.inner.nodes.len(),
            "Received state transfer"
        );
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.inner.name)
            .field("node", &self.inner.node_name)
            .field("mode", &self.mode())
            .field("status", &self.status())
            .field("node_count", &self.inner.nodes.len())
            .finish()
    }
}

impl std::fmt::Debug for DecoratedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoratedCache")
            .field("cache", &self.cache)
            .field("context", &self.context.name())
            .finish()
    }
}
