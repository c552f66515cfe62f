//! Error types for snapshot source operations.
//!
//! This module provides [`McpError`], the single error type shared by the
//! loader, the snapshot builder, and the change watcher. Every variant is
//! recovered at the rebuild boundary; only a failed initial load escapes to
//! the caller that constructs the watcher.

use std::path::PathBuf;

/// Boxed error used for causes produced by pluggable components.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Comprehensive error type for snapshot source operations.
///
/// # Example
///
/// ```rust
/// use mcp_core::McpError;
///
/// fn check_kind(kind: &str) -> Result<(), McpError> {
///     if kind != "gateway" {
///         return Err(McpError::UnknownResourceType {
///             kind: kind.to_string(),
///         });
///     }
///     Ok(())
/// }
///
/// assert!(check_kind("sidecar").is_err());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// A file under the document source could not be read.
    #[error("failed to read {}: {source}", path.display())]
    SourceRead {
        /// Path of the unreadable file or directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File content could not be decoded into typed objects.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: BoxError,
    },

    /// A resource-type key outside the supported set was found.
    #[error("config type {kind} unknown")]
    UnknownResourceType {
        /// The unsupported key.
        kind: String,
    },

    /// A typed object could not be encoded while wrapping.
    #[error("serialization error for {type_url}/{name}: {message}")]
    Serialization {
        /// Collection of the object.
        type_url: String,
        /// Name of the object.
        name: String,
        /// Encoder message.
        message: String,
    },

    /// An envelope body could not be decoded back into a typed object.
    #[error("decoding error for {type_url}: {message}")]
    Decoding {
        /// Type URL carried by the envelope body.
        type_url: String,
        /// Decoder message.
        message: String,
    },

    /// The filesystem subscription failed.
    #[error("watch error: {message}")]
    Watch {
        /// Description of the failure.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl McpError {
    /// Create a read error for `path`.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceRead {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for `path` from any error type.
    pub fn parse<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Create a watch error from any error type.
    pub fn watch<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Watch {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The file this error is attributed to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::SourceRead { path, .. } | Self::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}
