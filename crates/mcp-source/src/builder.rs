//! Building snapshots from grouped objects.

use mcp_cache::Snapshot;
use mcp_core::{McpError, ResourceKind, ResourceVersion, Result};
use tracing::debug;

use crate::loader::GroupedObjects;
use crate::wrapper::ResourceWrapper;

/// Wrap every group and assemble a snapshot at `version`.
///
/// Every group carries `version`. Keys without objects are left out of the
/// snapshot. A key outside [`ResourceKind`] fails the whole build, as does
/// any object that fails to encode.
pub fn build_snapshot(groups: &GroupedObjects, version: &ResourceVersion) -> Result<Snapshot> {
    let kinds = groups
        .keys()
        .map(|key| {
            ResourceKind::from_key(key)
                .map(|kind| (kind, key))
                .ok_or_else(|| McpError::UnknownResourceType { kind: key.clone() })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut wrapper = ResourceWrapper::new();
    let mut builder = Snapshot::builder().version(version.clone());

    for (kind, key) in kinds {
        let objects = &groups[key];
        if objects.is_empty() {
            continue;
        }
        let envelopes = wrapper.wrap_all(objects)?;
        debug!(kind = %kind, count = envelopes.len(), version = %version, "wrapped group");
        builder = builder.resources(kind.type_url(), envelopes);
    }

    Ok(builder.build())
}
