//! Hierarchical view over a [`Cache`]
//!
//! Values are addressed by an [`Fqn`] naming the node plus a string key inside
//! that node. How a value is stored depends on the cache mode: a local cache
//! keeps the object itself, a clustered one keeps its marshalled form and
//! needs a [`ClassContext`] to turn it back into an object on read.

use crate::cache::{Cache, DecoratedCache};
use crate::context::{default_context, ClassContext};
use crate::marshal::{Entry, Marshalled};
use crate::status::ComponentStatus;
use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt::Write as _;
use std::sync::Arc;
use treecache_core::{Error, Fqn, Result};

#[derive(Clone)]
pub struct TreeCache {
    cache: Cache,
    context: Option<Arc<dyn ClassContext>>,
}

impl TreeCache {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            context: None,
        }
    }

    /// Tree over a cache that reads with the decorated cache's context
    pub fn decorated(decorated: DecoratedCache) -> Self {
        Self {
            cache: decorated.cache().clone(),
            context: Some(Arc::clone(decorated.context())),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Context supplied at construction, if any
    pub fn context(&self) -> Option<&Arc<dyn ClassContext>> {
        self.context.as_ref()
    }

    pub fn status(&self) -> ComponentStatus {
        self.cache.status()
    }

    pub fn start(&self) -> Result<()> {
        self.cache.start()
    }

    pub fn stop(&self) -> Result<()> {
        self.cache.stop()
    }

    /// Store `value` under `key` at `fqn`, returning whether a value was replaced
    pub fn put<V>(&self, fqn: &Fqn, key: &str, value: V) -> Result<bool>
    where
        V: Serialize + Any + Send + Sync,
    {
        let entry = if self.cache.mode().is_clustered() {
            Entry::Marshalled(Marshalled::marshal(&value)?)
        } else {
            Entry::object(value)
        };
        Ok(self.cache.put_entry(fqn, key, entry)?.is_some())
    }

    /// Read the value under `key` at `fqn` as a `V`
    pub fn get<V>(&self, fqn: &Fqn, key: &str) -> Result<Option<V>>
    where
        V: Any + Clone + Send + Sync,
    {
        let Some(entry) = self.cache.get_entry(fqn, key)? else {
            return Ok(None);
        };

        let mismatch = |found: &str| Error::TypeMismatch {
            fqn: fqn.to_string(),
            key: key.to_string(),
            expected: type_name::<V>().to_string(),
            found: found.to_string(),
        };
        match entry {
            Entry::Object { type_name, value } => value
                .downcast_ref::<V>()
                .cloned()
                .map(Some)
                .ok_or_else(|| mismatch(type_name)),
            Entry::Marshalled(marshalled) => {
                let context = self.resolve_context(fqn);
                let object = context.unmarshal(&marshalled)?;
                object
                    .downcast::<V>()
                    .map(|value| Some(*value))
                    .map_err(|_| mismatch(marshalled.type_name()))
            }
        }
    }

    /// Remove the value under `key` at `fqn`; true if there was one
    pub fn remove(&self, fqn: &Fqn, key: &str) -> Result<bool> {
        Ok(self.cache.remove_entry(fqn, key)?.is_some())
    }

    pub fn keys(&self, fqn: &Fqn) -> Result<Vec<String>> {
        self.cache.keys(fqn)
    }

    pub fn exists(&self, fqn: &Fqn) -> Result<bool> {
        self.cache.contains_node(fqn)
    }

    /// Remove the node at `fqn` together with its whole subtree
    pub fn remove_node(&self, fqn: &Fqn) -> Result<bool> {
        self.cache.remove_node(fqn)
    }

    /// Direct children of `fqn`
    pub fn children(&self, fqn: &Fqn) -> Result<Vec<Fqn>> {
        self.cache.children(fqn)
    }

    /// Context a read at `fqn` would use
    pub fn resolve_context(&self, fqn: &Fqn) -> Arc<dyn ClassContext> {
        if let Some(context) = self.cache.regions().context_for(fqn) {
            return context;
        }
        match &self.context {
            Some(context) => Arc::clone(context),
            None => default_context(),
        }
    }

    /// One line per node, entries indented beneath it
    pub fn print_details(&self) -> Result<String> {
        let mut out = String::new();
        for (fqn, entries) in self.cache.snapshot()? {
            let _ = writeln!(out, "{fqn}");
            for (key, entry) in entries {
                let _ = writeln!(out, "  {key} = {}", entry.describe());
            }
        }
        Ok(out)
    }
}

impl std::fmt::Debug for TreeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeCache")
            .field("cache", &self.cache)
            .field("context", &self.context.as_ref().map(|c| c.name().to_string()))
            .finish()
    }
}
