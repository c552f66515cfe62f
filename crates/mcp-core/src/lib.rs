//! # mcp-core
//!
//! Core types, traits, and error handling for the mesh configuration
//! snapshot source.
//!
//! This crate provides the foundational types used across all other crates:
//!
//! - [`McpError`] - Error type covering every load, build and watch failure
//! - [`ResourceVersion`] - Version strings compared by watches
//! - [`TypeUrl`] - Collection type URLs and the served collection list
//! - [`ResourceKind`] - The closed set of supported resource-type keys
//! - [`TypedObject`] - Trait for parsed configuration payloads
//! - [`ResourceEnvelope`] - A payload wrapped for publication
//!
//! ## Example
//!
//! ```rust
//! use mcp_core::{ResourceKind, ResourceVersion, TypeUrl};
//!
//! let kind = ResourceKind::from_key("service-entry").unwrap();
//! assert_eq!(kind.type_url(), TypeUrl::new(TypeUrl::SERVICE_ENTRY));
//!
//! let version = ResourceVersion::from_sequence(1);
//! assert_eq!(version.as_str(), "1.0");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod kind;
mod resource;
mod type_url;
mod version;

pub use error::{BoxError, McpError};
pub use kind::ResourceKind;
pub use resource::{AnyObject, BoxObject, Metadata, ResourceEnvelope, TypedObject};
pub use type_url::TypeUrl;
pub use version::ResourceVersion;

/// Result type alias using [`McpError`].
pub type Result<T> = std::result::Result<T, McpError>;
