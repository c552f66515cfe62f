//! Source configuration.

use std::path::{Path, PathBuf};

use mcp_core::{McpError, Result};

/// Default capacity of the filesystem event queue.
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Configuration for a filesystem document source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// File or directory holding the configuration documents.
    pub root: PathBuf,
    /// Capacity of the queue between the filesystem callback and the
    /// rebuild task. Events arriving while it is full are dropped.
    pub event_buffer: usize,
}

impl SourceConfig {
    /// Create a configuration for `root` with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    /// Set the event queue capacity.
    #[must_use]
    pub fn with_event_buffer(mut self, event_buffer: usize) -> Self {
        self.event_buffer = event_buffer;
        self
    }

    /// The document root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(McpError::Configuration("root path is empty".into()));
        }
        if self.event_buffer == 0 {
            return Err(McpError::Configuration(
                "event buffer must hold at least one event".into(),
            ));
        }
        Ok(())
    }
}
