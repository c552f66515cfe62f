//! Typed configuration objects and their published envelopes.
//!
//! The parser produces [`TypedObject`]s; the wrapper turns each one into a
//! [`ResourceEnvelope`] carrying the object's name, a creation timestamp and
//! the encoded body that consumers receive.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::McpError;

/// Trait for typed configuration payloads.
///
/// Implement this trait for every message a document parser can produce.
///
/// # Example
///
/// ```rust
/// use mcp_core::{TypedObject, TypeUrl};
/// use prost_types::Any;
/// use std::any::Any as StdAny;
///
/// #[derive(Debug)]
/// struct RawGateway(Vec<u8>);
///
/// impl TypedObject for RawGateway {
///     fn type_url(&self) -> &str {
///         TypeUrl::GATEWAY
///     }
///
///     fn encode(&self) -> Result<Any, Box<dyn std::error::Error + Send + Sync>> {
///         Ok(Any {
///             type_url: self.type_url().to_string(),
///             value: self.0.clone(),
///         })
///     }
///
///     fn as_any(&self) -> &dyn StdAny {
///         self
///     }
/// }
/// ```
pub trait TypedObject: Send + Sync + fmt::Debug {
    /// Type URL of the encoded message.
    fn type_url(&self) -> &str;

    /// Encode the object to a protobuf Any message.
    fn encode(&self) -> Result<prost_types::Any, BoxError>;

    /// Convert to Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shared, immutable typed object.
pub type BoxObject = Arc<dyn TypedObject>;

/// A pre-encoded Any message that implements [`TypedObject`].
///
/// This allows feeding raw protobuf Any messages through the wrapper
/// without needing their concrete message type.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyObject {
    any: prost_types::Any,
}

impl AnyObject {
    /// Create a new AnyObject.
    #[must_use]
    pub fn new(any: prost_types::Any) -> Self {
        Self { any }
    }

    /// Get the inner Any message.
    #[must_use]
    pub fn inner(&self) -> &prost_types::Any {
        &self.any
    }
}

impl TypedObject for AnyObject {
    fn type_url(&self) -> &str {
        &self.any.type_url
    }

    fn encode(&self) -> Result<prost_types::Any, BoxError> {
        Ok(self.any.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Name of the wrapped object, unique within its collection.
    pub name: String,
    /// Creation time shared by every envelope of one load pass.
    pub create_time: prost_types::Timestamp,
}

/// A typed object wrapped for publication.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEnvelope {
    metadata: Metadata,
    body: prost_types::Any,
}

impl ResourceEnvelope {
    /// Create a new envelope.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        create_time: prost_types::Timestamp,
        body: prost_types::Any,
    ) -> Self {
        Self {
            metadata: Metadata {
                name: name.into(),
                create_time,
            },
            body,
        }
    }

    /// Name of the wrapped object.
    #[inline]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Envelope metadata.
    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Creation timestamp.
    #[inline]
    pub fn create_time(&self) -> &prost_types::Timestamp {
        &self.metadata.create_time
    }

    /// Encoded body.
    #[inline]
    pub fn body(&self) -> &prost_types::Any {
        &self.body
    }

    /// Decode the body back into its message type.
    pub fn decode<M>(&self) -> Result<M, McpError>
    where
        M: prost::Name + Default,
    {
        self.body.to_msg::<M>().map_err(|e| McpError::Decoding {
            type_url: self.body.type_url.clone(),
            message: e.to_string(),
        })
    }
}
