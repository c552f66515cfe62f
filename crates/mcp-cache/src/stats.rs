//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for cache operations.
///
/// All counters are atomic and can be safely accessed from multiple threads.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of snapshots published.
    snapshots_published: AtomicU64,
    /// Number of `current` reads.
    current_reads: AtomicU64,
    /// Watches answered at once because the consumer was stale.
    immediate_responses: AtomicU64,
    /// Watches registered to wait for the next change.
    watches_registered: AtomicU64,
    /// Registered watches resolved by a publish.
    watches_fulfilled: AtomicU64,
    /// Registered watches cancelled before resolution.
    watches_cancelled: AtomicU64,
}

impl CacheStats {
    /// Create new cache statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a publish.
    #[inline]
    pub fn record_publish(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a `current` read.
    #[inline]
    pub fn record_read(&self) {
        self.current_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a watch answered immediately.
    #[inline]
    pub fn record_immediate(&self) {
        self.immediate_responses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a registered watch.
    #[inline]
    pub fn record_registered(&self) {
        self.watches_registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record watches resolved by a publish.
    #[inline]
    pub fn record_fulfilled(&self, count: u64) {
        self.watches_fulfilled.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a cancelled watch.
    #[inline]
    pub fn record_cancelled(&self) {
        self.watches_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total snapshots published.
    #[inline]
    pub fn snapshots_published(&self) -> u64 {
        self.snapshots_published.load(Ordering::Relaxed)
    }

    /// Get total `current` reads.
    #[inline]
    pub fn current_reads(&self) -> u64 {
        self.current_reads.load(Ordering::Relaxed)
    }

    /// Get total immediate responses.
    #[inline]
    pub fn immediate_responses(&self) -> u64 {
        self.immediate_responses.load(Ordering::Relaxed)
    }

    /// Get total registered watches.
    #[inline]
    pub fn watches_registered(&self) -> u64 {
        self.watches_registered.load(Ordering::Relaxed)
    }

    /// Get total fulfilled watches.
    #[inline]
    pub fn watches_fulfilled(&self) -> u64 {
        self.watches_fulfilled.load(Ordering::Relaxed)
    }

    /// Get total cancelled watches.
    #[inline]
    pub fn watches_cancelled(&self) -> u64 {
        self.watches_cancelled.load(Ordering::Relaxed)
    }

    /// Fraction of watches answered without waiting (0.0 to 1.0).
    pub fn immediate_rate(&self) -> f64 {
        let immediate = self.immediate_responses() as f64;
        let total = immediate + self.watches_registered() as f64;
        if total == 0.0 {
            0.0
        } else {
            immediate / total
        }
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        self.snapshots_published.store(0, Ordering::Relaxed);
        self.current_reads.store(0, Ordering::Relaxed);
        self.immediate_responses.store(0, Ordering::Relaxed);
        self.watches_registered.store(0, Ordering::Relaxed);
        self.watches_fulfilled.store(0, Ordering::Relaxed);
        self.watches_cancelled.store(0, Ordering::Relaxed);
    }
}
