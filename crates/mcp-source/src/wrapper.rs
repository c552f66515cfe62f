//! Wrapping typed objects into publishable envelopes.

use std::time::SystemTime;

use mcp_core::{BoxObject, McpError, ResourceEnvelope, Result};
use tracing::trace;

/// A typed object together with its name.
#[derive(Debug, Clone)]
pub struct NamedObject {
    /// Name, unique within its kind for one load pass.
    pub name: String,
    /// The typed payload.
    pub object: BoxObject,
}

impl NamedObject {
    /// Pair a name with an object.
    pub fn new(name: impl Into<String>, object: BoxObject) -> Self {
        Self {
            name: name.into(),
            object,
        }
    }
}

/// Wraps typed objects into [`ResourceEnvelope`]s.
///
/// All envelopes produced by one wrapper share the creation timestamp
/// captured on first use. Use one wrapper per load pass.
#[derive(Debug, Default)]
pub struct ResourceWrapper {
    create_time: Option<prost_types::Timestamp>,
}

impl ResourceWrapper {
    /// Create a wrapper with no timestamp captured yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a wrapper stamping every envelope with `create_time`.
    pub fn with_create_time(create_time: prost_types::Timestamp) -> Self {
        Self {
            create_time: Some(create_time),
        }
    }

    /// The shared timestamp, if one has been captured.
    pub fn create_time(&self) -> Option<&prost_types::Timestamp> {
        self.create_time.as_ref()
    }

    /// Wrap one object.
    pub fn wrap(&mut self, named: &NamedObject) -> Result<ResourceEnvelope> {
        let create_time = self
            .create_time
            .get_or_insert_with(|| prost_types::Timestamp::from(SystemTime::now()))
            .clone();

        let body = named
            .object
            .encode()
            .map_err(|e| McpError::Serialization {
                type_url: named.object.type_url().to_string(),
                name: named.name.clone(),
                message: e.to_string(),
            })?;

        trace!(name = %named.name, type_url = %body.type_url, "wrapped object");
        Ok(ResourceEnvelope::new(named.name.clone(), create_time, body))
    }

    /// Wrap every object, preserving order.
    ///
    /// Stops at the first object that fails to encode; no partial result is
    /// returned.
    pub fn wrap_all(&mut self, objects: &[NamedObject]) -> Result<Vec<ResourceEnvelope>> {
        objects.iter().map(|named| self.wrap(named)).collect()
    }
}
