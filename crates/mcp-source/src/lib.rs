//! # mcp-source
//!
//! Filesystem document source for the snapshot cache.
//!
//! This crate turns a directory of configuration documents into published
//! snapshots:
//!
//! - [`DocumentLoader`] - Walks the root and parses every file
//! - [`YamlParser`] - Decodes Istio networking custom resources
//! - [`ResourceWrapper`] - Encodes typed objects into envelopes
//! - [`build_snapshot`] - Assembles one versioned snapshot
//! - [`ConfigWatcher`] - Rebuilds and publishes on every change
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mcp_core::ResourceVersion;
//! use mcp_source::{build_snapshot, DocumentLoader, YamlParser};
//!
//! let loader = DocumentLoader::new("/etc/mesh", Arc::new(YamlParser::new()));
//! let groups = loader.load()?;
//! let snapshot = build_snapshot(&groups, &ResourceVersion::from_sequence(1))?;
//! println!("{} resources at {}", snapshot.total_resources(), snapshot.version());
//! # Ok::<(), mcp_core::McpError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod loader;
mod parser;
mod watcher;
mod wrapper;

pub use builder::build_snapshot;
pub use config::{SourceConfig, DEFAULT_EVENT_BUFFER};
pub use loader::{DocumentLoader, GroupedObjects};
pub use parser::{DocumentParser, ParseError, ParsedObject, YamlParser, ISTIO_NETWORKING_GROUP};
pub use watcher::{ConfigWatcher, RebuildEvent, WatcherState};
pub use wrapper::{NamedObject, ResourceWrapper};
