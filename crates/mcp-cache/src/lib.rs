//! # mcp-cache
//!
//! Versioned snapshot cache for mesh configuration collections.
//!
//! This crate provides the layer between the configuration loader and the
//! publishing layer:
//!
//! - [`SnapshotCache`] - Holds the current snapshot and pending watches
//! - [`Snapshot`] - Immutable set of resource groups at one version
//! - [`Watch`] - Single-shot long-poll on one collection
//!
//! ## Key Design Decisions
//!
//! - One short-lived lock guards both the snapshot and the watch registry
//! - Watch responses are delivered after the lock is released
//! - Snapshots are immutable and atomically replaced
//!
//! ## Example
//!
//! ```rust
//! use mcp_cache::{Cache, Snapshot, SnapshotCache};
//! use mcp_core::TypeUrl;
//!
//! let cache = SnapshotCache::new();
//!
//! let snapshot = Snapshot::builder()
//!     .version("1.0")
//!     .resources(TypeUrl::SERVICE_ENTRY, vec![])
//!     .build();
//! cache.publish(snapshot);
//!
//! assert_eq!(cache.current(TypeUrl::SERVICE_ENTRY).version(), "1.0");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod snapshot;
mod stats;
mod watch;

pub use cache::{Cache, SnapshotCache};
pub use snapshot::{ResourceGroup, SharedSnapshot, Snapshot, SnapshotBuilder};
pub use stats::CacheStats;
pub use watch::{Watch, WatchId, WatchResponse};
