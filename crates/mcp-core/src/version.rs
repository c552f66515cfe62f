//! Snapshot version tracking.
//!
//! This module provides [`ResourceVersion`], the string compared by watches
//! to decide whether a consumer has already seen the latest data. Comparison
//! is by exact equality only; versions are never ordered.

use std::fmt;

/// Version identifier for a resource group.
///
/// An empty version represents the initial state (no version received yet).
///
/// # Example
///
/// ```rust
/// use mcp_core::ResourceVersion;
///
/// let v1 = ResourceVersion::from_sequence(1);
/// let v2 = v1.next();
/// let empty = ResourceVersion::empty();
///
/// assert_eq!(v1.as_str(), "1.0");
/// assert_eq!(v2.as_str(), "2.0");
/// assert!(empty.is_empty());
/// assert_ne!(v1, v2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourceVersion {
    label: String,
    sequence: u64,
}

impl ResourceVersion {
    /// Create a version from an arbitrary label.
    ///
    /// Labels that are not in `"{n}.0"` form carry sequence 0.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        let label = version.into();
        let sequence = label
            .strip_suffix(".0")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        Self { label, sequence }
    }

    /// Create the version for the `sequence`th successful build.
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self {
            label: format!("{sequence}.0"),
            sequence,
        }
    }

    /// Create an empty resource version (initial state).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The version following this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self::from_sequence(self.sequence + 1)
    }

    /// Numeric build sequence behind this version.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Check if the version is empty (initial state).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// Get the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.label
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl From<String> for ResourceVersion {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ResourceVersion {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ResourceVersion> for String {
    fn from(v: ResourceVersion) -> Self {
        v.label
    }
}

impl AsRef<str> for ResourceVersion {
    fn as_ref(&self) -> &str {
        &self.label
    }
}
