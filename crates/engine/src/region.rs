//! Regions: subtrees bound to their own deserialization context

use crate::context::ClassContext;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use treecache_core::Fqn;

/// A subtree root together with the context governing it
#[derive(Debug, Clone)]
pub struct Region {
    fqn: Fqn,
    context: Option<Arc<dyn ClassContext>>,
    active: bool,
}

impl Region {
    pub fn fqn(&self) -> &Fqn {
        &self.fqn
    }

    pub fn context(&self) -> Option<&Arc<dyn ClassContext>> {
        self.context.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Table of regions for one cache.
///
/// Every mutation happens under a single write lock, so a lookup never sees
/// a region half way through being bound or unbound.
#[derive(Debug, Default)]
pub struct RegionManager {
    regions: RwLock<HashMap<Fqn, Region>>,
}

impl RegionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the context for the subtree at `fqn`
    pub fn bind(&self, fqn: &Fqn, context: Arc<dyn ClassContext>, activate: bool) {
        let mut regions = self.regions.write();
        let region = regions.entry(fqn.clone()).or_insert_with(|| Region {
            fqn: fqn.clone(),
            context: None,
            active: false,
        });
        region.context = Some(context);
        if activate {
            region.active = true;
        }
        tracing::debug!(region = %fqn, active = region.active, "Bound region context");
    }

    /// Deactivate, clear and remove the region rooted exactly at `fqn`
    pub fn unbind(&self, fqn: &Fqn) -> Option<Region> {
        let mut regions = self.regions.write();
        let mut region = regions.remove(fqn)?;
        region.active = false;
        region.context = None;
        tracing::debug!(region = %fqn, "Unbound region context");
        Some(region)
    }

    /// Snapshot of the region rooted exactly at `fqn`
    pub fn region(&self, fqn: &Fqn) -> Option<Region> {
        self.regions.read().get(fqn).cloned()
    }

    /// Context of the most specific active region enclosing `fqn`
    pub fn context_for(&self, fqn: &Fqn) -> Option<Arc<dyn ClassContext>> {
        let regions = self.regions.read();
        fqn.ancestors().find_map(|ancestor| {
            regions
                .get(&ancestor)
                .filter(|region| region.active)
                .and_then(|region| region.context.clone())
        })
    }

    /// Activate every region that has a context; returns how many changed
    pub fn activate_all(&self) -> usize {
        let mut regions = self.regions.write();
        let mut activated = 0;
        for region in regions.values_mut() {
            if region.context.is_some() && !region.active {
                region.active = true;
                activated += 1;
            }
        }
        activated
    }

    pub fn deactivate_all(&self) {
        for region in self.regions.write().values_mut() {
            region.active = false;
        }
    }

    pub fn len(&self) -> usize {
        self.regions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TypeRegistry;
    use treecache_core::fqn;

    fn context(name: &str) -> Arc<dyn ClassContext> {
        Arc::new(TypeRegistry::new(name))
    }

    fn resolved(manager: &RegionManager, fqn: &Fqn) -> Option<String> {
        manager
            .context_for(fqn)
            .map(|context| context.name().to_string())
    }

    #[test]
    fn test_lookups_never_see_a_partial_binding() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let manager = RegionManager::new();
        manager.bind(&fqn!["a"], context("outer"), true);
        let inner = fqn!["a", "b"];
        let target = fqn!["a", "b", "c"];
        let done = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..2_000 {
                    manager.bind(&inner, context("inner"), true);
                    manager.unbind(&inner);
                }
                done.store(true, Ordering::Release);
            });
            s.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let name = resolved(&manager, &target);
                    assert!(
                        matches!(name.as_deref(), Some("inner") | Some("outer")),
                        "unexpected context {name:?}"
                    );
                }
            });
        });

        assert_eq!(resolved(&manager, &target).as_deref(), Some("outer"));
    }

    #[test]
    fn test_most_specific_ancestor_wins() {
        let manager = RegionManager::new();
        manager.bind(&fqn!["a"], context("outer"), true);
        manager.bind(&fqn!["a", "b"], context("inner"), true);

        assert_eq!(resolved(&manager, &fqn!["a", "b", "c"]).as_deref(), Some("inner"));
        assert_eq!(resolved(&manager, &fqn!["a", "b"]).as_deref(), Some("inner"));
        assert_eq!(resolved(&manager, &fqn!["a", "x"]).as_deref(), Some("outer"));
        assert_eq!(resolved(&manager, &fqn!["z"]), None);
    }

    #[test]
    fn test_inactive_regions_are_skipped() {
        let manager = RegionManager::new();
        manager.bind(&fqn!["a"], context("outer"), true);
        manager.bind(&fqn!["a", "b"], context("pending"), false);

        assert_eq!(resolved(&manager, &fqn!["a", "b", "c"]).as_deref(), Some("outer"));
        assert_eq!(manager.activate_all(), 1);
        assert_eq!(resolved(&manager, &fqn!["a", "b", "c"]).as_deref(), Some("pending"));
    }

    #[test]
    fn test_bind_replaces_context() {
        let manager = RegionManager::new();
        manager.bind(&fqn!["a"], context("first"), true);
        manager.bind(&fqn!["a"], context("second"), false);

        let region = manager.region(&fqn!["a"]).unwrap();
        assert!(region.is_active());
        assert_eq!(region.context().unwrap().name(), "second");
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_unbind_exact_root_only() {
        let manager = RegionManager::new();
        manager.bind(&fqn!["a"], context("outer"), true);

        assert!(manager.unbind(&fqn!["a", "b"]).is_none());
        assert_eq!(manager.len(), 1);

        let removed = manager.unbind(&fqn!["a"]).unwrap();
        assert!(!removed.is_active());
        assert!(removed.context().is_none());
        assert!(manager.is_empty());
        assert_eq!(resolved(&manager, &fqn!["a", "x"]), None);
    }
}
