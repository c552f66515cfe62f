//! Watch system for long-poll consumers.
//!
//! The watch system provides:
//! - Unique watch identifiers ([`WatchId`])
//! - Single-shot watch handles ([`Watch`]) resolved with a [`WatchResponse`]
//! - A registry of pending watches owned by the cache
//!
//! A watch is resolved at most once. Consumers re-issue a watch with the
//! version they just received to keep following a collection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mcp_core::{ResourceEnvelope, TypeUrl};
use tokio::sync::oneshot;
use tracing::trace;

use crate::snapshot::ResourceGroup;

/// Unique identifier for a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    /// Create a new unique watch ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value of this watch ID.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// The state of one collection delivered to a consumer.
#[derive(Debug, Clone)]
pub struct WatchResponse {
    type_url: TypeUrl,
    group: Arc<ResourceGroup>,
}

impl WatchResponse {
    pub(crate) fn new(type_url: TypeUrl, group: Arc<ResourceGroup>) -> Self {
        Self { type_url, group }
    }

    /// Collection this response describes.
    #[inline]
    pub fn type_url(&self) -> &TypeUrl {
        &self.type_url
    }

    /// Version of the delivered group.
    #[inline]
    pub fn version(&self) -> &str {
        self.group.version()
    }

    /// Envelopes of the delivered group.
    #[inline]
    pub fn resources(&self) -> &[ResourceEnvelope] {
        self.group.resources()
    }

    /// The delivered group.
    #[inline]
    pub fn group(&self) -> &Arc<ResourceGroup> {
        &self.group
    }
}

/// A single-shot watch on one collection.
///
/// If the consumer's version was already stale when the watch was issued,
/// the response is available immediately; otherwise it arrives with the
/// next publish that changes the collection's version.
#[derive(Debug)]
pub struct Watch {
    /// Unique identifier for this watch.
    id: WatchId,
    /// Collection this watch follows.
    type_url: TypeUrl,
    /// Receiver for the single response; `None` once it has been taken.
    receiver: Option<oneshot::Receiver<WatchResponse>>,
}

impl Watch {
    pub(crate) fn new(
        id: WatchId,
        type_url: TypeUrl,
        receiver: oneshot::Receiver<WatchResponse>,
    ) -> Self {
        Self {
            id,
            type_url,
            receiver: Some(receiver),
        }
    }

    /// Get the unique identifier for this watch.
    #[inline]
    pub fn id(&self) -> WatchId {
        self.id
    }

    /// Get the collection this watch follows.
    #[inline]
    pub fn type_url(&self) -> &TypeUrl {
        &self.type_url
    }

    /// Wait for the response.
    ///
    /// Returns `None` if the watch was cancelled, or if the response was
    /// already taken.
    pub async fn recv(&mut self) -> Option<WatchResponse> {
        let receiver = self.receiver.as_mut()?;
        let response = receiver.await.ok();
        self.receiver = None;
        response
    }

    /// Take the response without waiting.
    ///
    /// Returns:
    /// - `Ok(response)` if the response is available
    /// - `Err(TryRecvError::Empty)` if the watch is still pending
    /// - `Err(TryRecvError::Closed)` if the watch was cancelled or already resolved
    pub fn try_recv(&mut self) -> Result<WatchResponse, oneshot::error::TryRecvError> {
        let receiver = self
            .receiver
            .as_mut()
            .ok_or(oneshot::error::TryRecvError::Closed)?;
        let result = receiver.try_recv();
        if !matches!(result, Err(oneshot::error::TryRecvError::Empty)) {
            self.receiver = None;
        }
        result
    }

    /// Check if the watch has been resolved or cancelled.
    pub fn is_terminated(&self) -> bool {
        self.receiver.is_none()
    }
}

/// A pending watch held by the cache.
#[derive(Debug)]
pub(crate) struct PendingWatch {
    id: WatchId,
    version: String,
    sender: oneshot::Sender<WatchResponse>,
}

impl PendingWatch {
    pub(crate) fn new(
        id: WatchId,
        version: impl Into<String>,
        sender: oneshot::Sender<WatchResponse>,
    ) -> Self {
        Self {
            id,
            version: version.into(),
            sender,
        }
    }

    /// Resolve the watch. Returns `false` if the consumer is gone.
    pub(crate) fn fulfill(self, response: WatchResponse) -> bool {
        self.sender.send(response).is_ok()
    }

    #[inline]
    pub(crate) fn id(&self) -> WatchId {
        self.id
    }
}

/// Registry of pending watches, keyed by collection.
///
/// The registry holds no lock of its own; the cache mutates it while holding
/// its state lock so that registration and publication are atomic.
#[derive(Debug, Default)]
pub(crate) struct WatchRegistry {
    watches: HashMap<TypeUrl, Vec<PendingWatch>>,
}

impl WatchRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, type_url: TypeUrl, watch: PendingWatch) {
        trace!(watch_id = %watch.id, type_url = %type_url, version = %watch.version, "registered watch");
        self.watches.entry(type_url).or_default().push(watch);
    }

    /// Remove a pending watch without resolving it.
    pub(crate) fn cancel(&mut self, watch_id: WatchId) -> bool {
        for pending in self.watches.values_mut() {
            if let Some(pos) = pending.iter().position(|w| w.id == watch_id) {
                pending.swap_remove(pos);
                return true;
            }
        }
        false
    }

    /// Collections with at least one pending watch.
    pub(crate) fn type_urls(&self) -> Vec<TypeUrl> {
        self.watches
            .iter()
            .filter(|(_, pending)| !pending.is_empty())
            .map(|(type_url, _)| type_url.clone())
            .collect()
    }

    /// Remove and return every watch on `type_url` whose version differs
    /// from `version`. Watches whose consumer is gone are dropped.
    pub(crate) fn take_changed(&mut self, type_url: &str, version: &str) -> Vec<PendingWatch> {
        let Some(pending) = self.watches.get_mut(type_url) else {
            return Vec::new();
        };

        pending.retain(|w| !w.sender.is_closed());

        let (changed, unchanged): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|w| w.version != version);
        *pending = unchanged;

        if pending.is_empty() {
            self.watches.remove(type_url);
        }
        changed
    }

    pub(crate) fn watch_count(&self, type_url: &str) -> usize {
        self.watches.get(type_url).map(Vec::len).unwrap_or(0)
    }

    pub(crate) fn total_watch_count(&self) -> usize {
        self.watches.values().map(Vec::len).sum()
    }
}
