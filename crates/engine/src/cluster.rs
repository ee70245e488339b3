//! In-process cluster transport
//!
//! Clustered caches that share a cluster name and a cache name form a group.
//! Membership lives in a process-wide table; members are held weakly so a
//! dropped cache simply disappears from its group. Delivery between members
//! is a direct, synchronous call.

use crate::cache::CacheInner;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use treecache_core::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    cluster: String,
    cache: String,
}

impl GroupKey {
    fn new(cluster: &str, cache: &str) -> Self {
        Self {
            cluster: cluster.to_string(),
            cache: cache.to_string(),
        }
    }
}

struct Member {
    node: String,
    inner: Weak<CacheInner>,
}

static GROUPS: Lazy<Mutex<HashMap<GroupKey, Vec<Member>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Add `inner` to its group, returning the members that were already there
pub(crate) fn join(
    cluster: &str,
    cache: &str,
    node: &str,
    inner: &Arc<CacheInner>,
) -> Result<Vec<Arc<CacheInner>>> {
    let mut groups = GROUPS.lock();
    let members = groups.entry(GroupKey::new(cluster, cache)).or_default();
    members.retain(|member| member.inner.strong_count() > 0);

    if members.iter().any(|member| member.node == node) {
        return Err(Error::lifecycle(
            cache,
            "start",
            format!("node '{node}' is already a member of cluster '{cluster}'"),
        ));
    }

    let existing = members
        .iter()
        .filter_map(|member| member.inner.upgrade())
        .collect();
    members.push(Member {
        node: node.to_string(),
        inner: Arc::downgrade(inner),
    });
    tracing::debug!(cluster, cache, node, size = members.len(), "Joined cluster");
    Ok(existing)
}

pub(crate) fn leave(cluster: &str, cache: &str, node: &str) {
    let mut groups = GROUPS.lock();
    let key = GroupKey::new(cluster, cache);
    if let Some(members) = groups.get_mut(&key) {
        members.retain(|member| member.node != node && member.inner.strong_count() > 0);
        tracing::debug!(cluster, cache, node, size = members.len(), "Left cluster");
        if members.is_empty() {
            groups.remove(&key);
        }
    }
}

/// Live members of the group other than `node`
pub(crate) fn peers(cluster: &str, cache: &str, node: &str) -> Vec<Arc<CacheInner>> {
    let groups = GROUPS.lock();
    groups
        .get(&GroupKey::new(cluster, cache))
        .map(|members| {
            members
                .iter()
                .filter(|member| member.node != node)
                .filter_map(|member| member.inner.upgrade())
                .collect()
        })
        .unwrap_or_default()
}

/// Node names currently in the group for `cache` in `cluster`
pub fn members(cluster: &str, cache: &str) -> Vec<String> {
    let groups = GROUPS.lock();
    let mut nodes: Vec<String> = groups
        .get(&GroupKey::new(cluster, cache))
        .map(|members| {
            members
                .iter()
                .filter(|member| member.inner.strong_count() > 0)
                .map(|member| member.node.clone())
                .collect()
        })
        .unwrap_or_default();
    nodes.sort();
    nodes
}
