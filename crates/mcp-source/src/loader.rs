//! Loading documents from the filesystem.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mcp_core::{McpError, Result};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::parser::DocumentParser;
use crate::wrapper::NamedObject;

/// Typed objects grouped by resource-type key, each group in visitation order.
pub type GroupedObjects = HashMap<String, Vec<NamedObject>>;

/// Reads every file under a root and groups the parsed objects.
#[derive(Clone)]
pub struct DocumentLoader {
    root: PathBuf,
    parser: Arc<dyn DocumentParser>,
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl DocumentLoader {
    /// Create a loader for `root`, which may be a file or a directory.
    pub fn new(root: impl Into<PathBuf>, parser: Arc<dyn DocumentParser>) -> Self {
        Self {
            root: root.into(),
            parser,
        }
    }

    /// The document root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every regular file reachable from the root.
    ///
    /// Directories are walked recursively and symlinks are followed. The
    /// first file that cannot be read or parsed aborts the load with an error
    /// naming that file.
    pub fn load(&self) -> Result<GroupedObjects> {
        fs::metadata(&self.root).map_err(|e| McpError::read(&self.root, e))?;

        let mut groups = GroupedObjects::new();
        let mut files = 0usize;

        for entry in WalkDir::new(&self.root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(self.root.as_path()).to_path_buf();
                McpError::read(path, e.into())
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            self.load_file(entry.path(), &mut groups)?;
            files += 1;
        }

        debug!(
            root = %self.root.display(),
            files,
            kinds = groups.len(),
            "loaded documents"
        );
        Ok(groups)
    }

    /// Parse one file and append its objects to `groups`.
    pub fn load_file(&self, path: &Path, groups: &mut GroupedObjects) -> Result<()> {
        let bytes = fs::read(path).map_err(|e| McpError::read(path, e))?;
        let content = String::from_utf8(bytes).map_err(|e| McpError::parse(path, e))?;
        let objects = self
            .parser
            .parse(&content)
            .map_err(|e| McpError::parse(path, e))?;

        trace!(path = %path.display(), objects = objects.len(), "parsed file");

        for parsed in objects {
            groups
                .entry(parsed.kind_key)
                .or_default()
                .push(NamedObject::new(parsed.name, parsed.object));
        }
        Ok(())
    }
}
