//! Snapshot: immutable collection of published resource groups.
//!
//! A snapshot represents the complete configuration state at one version.
//! Snapshots are:
//!
//! - **Immutable**: Once created, a snapshot cannot be modified
//! - **Versioned**: Each snapshot and each of its groups carries a version
//! - **Type-organized**: Envelopes are grouped by collection type URL

use std::collections::HashMap;
use std::sync::Arc;

use mcp_core::{ResourceEnvelope, ResourceVersion, TypeUrl};

/// Envelopes of one collection sharing a single version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceGroup {
    /// Version string for this collection.
    version: ResourceVersion,
    /// Envelopes in load order.
    resources: Vec<ResourceEnvelope>,
}

impl ResourceGroup {
    /// Create a group from envelopes produced by one load pass.
    pub fn new(version: ResourceVersion, resources: Vec<ResourceEnvelope>) -> Self {
        Self { version, resources }
    }

    /// Create an empty group at `version`.
    pub fn empty(version: ResourceVersion) -> Self {
        Self::new(version, Vec::new())
    }

    /// Get the version for this collection.
    #[inline]
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Get the version as a [`ResourceVersion`].
    #[inline]
    pub fn resource_version(&self) -> &ResourceVersion {
        &self.version
    }

    /// Get the number of envelopes.
    #[inline]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if there are no envelopes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Get an envelope by name.
    pub fn get(&self, name: &str) -> Option<&ResourceEnvelope> {
        self.resources.iter().find(|r| r.name() == name)
    }

    /// All envelopes in load order.
    #[inline]
    pub fn resources(&self) -> &[ResourceEnvelope] {
        &self.resources
    }

    /// Iterate over all envelopes.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ResourceEnvelope> {
        self.resources.iter()
    }

    /// Get all resource names.
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(ResourceEnvelope::name)
    }
}

/// An immutable snapshot of every populated collection.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Version of the load pass that produced this snapshot.
    version: ResourceVersion,
    /// Groups keyed by collection type URL.
    groups: HashMap<TypeUrl, Arc<ResourceGroup>>,
    /// Creation timestamp.
    created_at: std::time::Instant,
}

impl Snapshot {
    /// Create a new snapshot builder.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// A snapshot with no groups at the empty version.
    pub fn empty() -> Self {
        SnapshotBuilder::new().build()
    }

    /// Get the version of this snapshot.
    #[inline]
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// Get the version as a [`ResourceVersion`].
    #[inline]
    pub fn resource_version(&self) -> &ResourceVersion {
        &self.version
    }

    /// Get the creation timestamp.
    #[inline]
    pub fn created_at(&self) -> std::time::Instant {
        self.created_at
    }

    /// Get the group for a collection.
    #[inline]
    pub fn get_group(&self, type_url: &str) -> Option<&Arc<ResourceGroup>> {
        self.groups.get(type_url)
    }

    /// Get the envelopes for a collection; empty if the collection is absent.
    pub fn resources(&self, type_url: &str) -> &[ResourceEnvelope] {
        self.groups
            .get(type_url)
            .map(|g| g.resources())
            .unwrap_or_default()
    }

    /// Get the version for a collection.
    #[inline]
    pub fn get_version(&self, type_url: &str) -> Option<&str> {
        self.groups.get(type_url).map(|g| g.version())
    }

    /// Check if this snapshot contains a collection.
    #[inline]
    pub fn contains_type(&self, type_url: &str) -> bool {
        self.groups.contains_key(type_url)
    }

    /// Get all collections present in this snapshot.
    pub fn type_urls(&self) -> impl Iterator<Item = &TypeUrl> {
        self.groups.keys()
    }

    /// Get the total number of envelopes across all collections.
    pub fn total_resources(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    /// Check if this snapshot is empty (no envelopes).
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|g| g.is_empty())
    }
}

/// Builder for creating snapshots.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    version: ResourceVersion,
    groups: HashMap<TypeUrl, Arc<ResourceGroup>>,
}

impl SnapshotBuilder {
    /// Create a new snapshot builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version for this snapshot.
    pub fn version(mut self, version: impl Into<ResourceVersion>) -> Self {
        self.version = version.into();
        self
    }

    /// Add envelopes for a collection.
    ///
    /// The group version defaults to the snapshot version.
    pub fn resources(
        self,
        type_url: impl Into<TypeUrl>,
        resources: impl IntoIterator<Item = ResourceEnvelope>,
    ) -> Self {
        let version = self.version.clone();
        self.resources_with_version(type_url, version, resources)
    }

    /// Add envelopes for a collection with a custom version.
    pub fn resources_with_version(
        mut self,
        type_url: impl Into<TypeUrl>,
        version: impl Into<ResourceVersion>,
        resources: impl IntoIterator<Item = ResourceEnvelope>,
    ) -> Self {
        let group = ResourceGroup::new(version.into(), resources.into_iter().collect());
        self.groups.insert(type_url.into(), Arc::new(group));
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> Snapshot {
        Snapshot {
            version: self.version,
            groups: self.groups,
            created_at: std::time::Instant::now(),
        }
    }
}

/// Wrapper around `Arc<Snapshot>` for convenient sharing.
pub type SharedSnapshot = Arc<Snapshot>;
