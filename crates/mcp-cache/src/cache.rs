//! Cache trait and SnapshotCache implementation.
//!
//! The cache holds the current snapshot and the pending watches. Both live
//! behind one short-lived lock so that a watch can never register against a
//! version that a concurrent publish has already replaced.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mcp_core::TypeUrl;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::snapshot::{ResourceGroup, Snapshot};
use crate::stats::CacheStats;
use crate::watch::{PendingWatch, Watch, WatchId, WatchRegistry, WatchResponse};

/// Trait for snapshot caches consumed by a publishing layer.
pub trait Cache: Send + Sync {
    /// Get the current group and version for a collection.
    ///
    /// A collection absent from the snapshot yields an empty group.
    fn current(&self, type_url: &str) -> WatchResponse;

    /// Atomically replace the current snapshot.
    ///
    /// Every pending watch on a collection whose version changed is resolved
    /// exactly once with the new group.
    fn publish(&self, snapshot: Snapshot);

    /// Watch a collection relative to the consumer's last-known version.
    ///
    /// If `last_version` differs from the current version the returned watch
    /// is already resolved; otherwise it resolves on the next change.
    fn watch(&self, type_url: &str, last_version: &str) -> Watch;

    /// Cancel a pending watch without resolving it.
    ///
    /// Returns `false` if the watch was already resolved or unknown.
    fn cancel(&self, watch_id: WatchId) -> bool;
}

/// State guarded by the cache lock.
#[derive(Debug)]
struct CacheState {
    /// The authoritative snapshot.
    snapshot: Arc<Snapshot>,
    /// Collections that have appeared in some published snapshot.
    seen: HashSet<TypeUrl>,
    /// Pending watches.
    watches: WatchRegistry,
}

impl CacheState {
    /// Resolve the group served for a collection.
    ///
    /// A collection that has appeared before but is missing from the current
    /// snapshot is served empty at the snapshot's version; one that has never
    /// appeared is served empty at the empty version.
    fn group(&self, type_url: &str) -> Arc<ResourceGroup> {
        match self.snapshot.get_group(type_url) {
            Some(group) => Arc::clone(group),
            None if self.seen.contains(type_url) => Arc::new(ResourceGroup::empty(
                self.snapshot.resource_version().clone(),
            )),
            None => Arc::new(ResourceGroup::default()),
        }
    }
}

/// Snapshot cache serving long-poll watches.
///
/// ## Thread Safety
///
/// All operations are thread-safe. The lock is held only to read or swap
/// state; watch responses are delivered after it is released, so a slow
/// consumer never stalls the next publish.
///
/// ## Example
///
/// ```rust
/// use mcp_cache::{Cache, Snapshot, SnapshotCache};
/// use mcp_core::TypeUrl;
///
/// let cache = SnapshotCache::new();
/// let mut watch = cache.watch(TypeUrl::GATEWAY, "");
/// assert!(watch.try_recv().is_err()); // nothing newer than "" yet
///
/// cache.publish(
///     Snapshot::builder()
///         .version("1.0")
///         .resources(TypeUrl::GATEWAY, vec![])
///         .build(),
/// );
/// assert_eq!(watch.try_recv().unwrap().version(), "1.0");
/// ```
#[derive(Debug)]
pub struct SnapshotCache {
    state: Mutex<CacheState>,
    stats: CacheStats,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::empty())
    }

    /// Create a cache serving `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let seen = snapshot.type_urls().cloned().collect();
        Self {
            state: Mutex::new(CacheState {
                snapshot: Arc::new(snapshot),
                seen,
                watches: WatchRegistry::new(),
            }),
            stats: CacheStats::new(),
        }
    }

    /// Get cache statistics.
    #[inline]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get the current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    /// Get the version of the current snapshot.
    pub fn version(&self) -> String {
        self.lock().snapshot.version().to_string()
    }

    /// Get the number of pending watches on a collection.
    pub fn watch_count(&self, type_url: &str) -> usize {
        self.lock().watches.watch_count(type_url)
    }

    /// Get the total number of pending watches.
    pub fn total_watch_count(&self) -> usize {
        self.lock().watches.total_watch_count()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // The state is replaced wholesale, so a panic elsewhere cannot leave
        // it half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Cache for SnapshotCache {
    fn current(&self, type_url: &str) -> WatchResponse {
        let group = self.lock().group(type_url);
        self.stats.record_read();
        trace!(type_url, version = group.version(), "current");
        WatchResponse::new(TypeUrl::new(type_url), group)
    }

    fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);

        // Swap state and collect resolved watches under the lock.
        let ready: Vec<(PendingWatch, WatchResponse)> = {
            let mut state = self.lock();
            state.seen.extend(snapshot.type_urls().cloned());
            state.snapshot = Arc::clone(&snapshot);

            let mut ready = Vec::new();
            for type_url in state.watches.type_urls() {
                let group = state.group(type_url.as_str());
                let changed = state.watches.take_changed(type_url.as_str(), group.version());
                for watch in changed {
                    ready.push((watch, WatchResponse::new(type_url.clone(), Arc::clone(&group))));
                }
            }
            ready
        };
        self.stats.record_publish();

        debug!(
            version = %snapshot.version(),
            resources = snapshot.total_resources(),
            watches = ready.len(),
            "published snapshot"
        );

        // Deliver outside the lock.
        let mut delivered = 0u64;
        for (watch, response) in ready {
            let id = watch.id();
            if watch.fulfill(response) {
                delivered += 1;
            } else {
                trace!(watch_id = %id, "watch abandoned before delivery");
            }
        }
        self.stats.record_fulfilled(delivered);
    }

    fn watch(&self, type_url: &str, last_version: &str) -> Watch {
        let id = WatchId::next();
        let (sender, receiver) = oneshot::channel();

        let ready = {
            let mut state = self.lock();
            let group = state.group(type_url);
            if group.version() == last_version {
                state.watches.register(
                    TypeUrl::new(type_url),
                    PendingWatch::new(id, last_version, sender),
                );
                None
            } else {
                Some((sender, group))
            }
        };

        match ready {
            Some((sender, group)) => {
                trace!(watch_id = %id, type_url, last_version, version = group.version(), "stale watch answered");
                // The receiver is held below, so this cannot fail.
                let _ = sender.send(WatchResponse::new(TypeUrl::new(type_url), group));
                self.stats.record_immediate();
            }
            None => self.stats.record_registered(),
        }

        Watch::new(id, TypeUrl::new(type_url), receiver)
    }

    fn cancel(&self, watch_id: WatchId) -> bool {
        let cancelled = self.lock().watches.cancel(watch_id);
        if cancelled {
            self.stats.record_cancelled();
            debug!(watch_id = %watch_id, "cancelled watch");
        } else {
            trace!(watch_id = %watch_id, "cancel of unknown or resolved watch");
        }
        cancelled
    }
}
