//! # mcp-snapshot
//!
//! Mesh configuration snapshot source for Rust.
//!
//! This crate watches a directory of Istio configuration documents and keeps
//! an in-memory, versioned snapshot of them that a publishing layer can serve
//! to long-poll consumers:
//!
//! - Multi-document YAML loading with typed Istio networking payloads
//! - Atomic, monotonically versioned snapshot replacement
//! - Single-shot, version-aware watches that never lose an update
//! - Automatic rebuild on filesystem changes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mcp_snapshot::prelude::*;
//!
//! # async fn run() -> McpResult<()> {
//! let cache = Arc::new(SnapshotCache::new());
//! let watcher = ConfigWatcher::new(SourceConfig::new("/etc/mesh"), Arc::clone(&cache))?;
//!
//! let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, "");
//! if let Some(response) = watch.recv().await {
//!     println!("{} service entries at {}", response.resources().len(), response.version());
//! }
//!
//! watcher.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! This library is organized into several crates:
//!
//! - `mcp-core` - Core types, traits, and error handling
//! - `mcp-types` - Istio payload messages
//! - `mcp-cache` - Snapshot cache with watch notifications
//! - `mcp-source` - Filesystem loader and change watcher
//!
//! This crate (`mcp-snapshot`) re-exports all public APIs for convenience.
//!
//! ## Design Principles
//!
//! 1. **No panics in library code** - All errors are returned as `Result`
//! 2. **No locks held across await points** - The cache lock guards only swaps and lookups
//! 3. **Full replace** - Every rebuild publishes a complete snapshot
//! 4. **Observable** - Structured `tracing` events throughout

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Re-export all sub-crates
pub use mcp_cache as cache;
pub use mcp_core as core;
pub use mcp_source as source;
pub use mcp_types as types;

/// Prelude module for convenient imports.
///
/// ```rust
/// use mcp_snapshot::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mcp_core::{
        BoxObject, McpError, ResourceEnvelope, ResourceKind, ResourceVersion, Result as McpResult,
        TypeUrl, TypedObject,
    };

    // Cache types
    pub use mcp_cache::{
        Cache, CacheStats, ResourceGroup, Snapshot, SnapshotBuilder, SnapshotCache, Watch,
        WatchId, WatchResponse,
    };

    // Source types
    pub use mcp_source::{
        build_snapshot, ConfigWatcher, DocumentLoader, DocumentParser, RebuildEvent,
        SourceConfig, WatcherState, YamlParser,
    };
}

/// Version information for this crate.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Minimum supported Rust version.
    pub const MSRV: &str = "1.75";

    /// Get version info as a string.
    pub fn version_string() -> String {
        format!("mcp-snapshot {} (MSRV {})", VERSION, MSRV)
    }
}
