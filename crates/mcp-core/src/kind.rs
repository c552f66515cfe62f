//! The closed set of resource kinds the snapshot builder accepts.

use std::fmt;
use std::str::FromStr;

use crate::{McpError, TypeUrl};

/// A supported resource-type key.
///
/// Documents are grouped by the kebab-case key produced by the parser
/// (`"gateway"`, `"virtual-service"`, `"service-entry"`). Any other key is
/// rejected when a snapshot is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Istio Gateway.
    Gateway,
    /// Istio VirtualService.
    VirtualService,
    /// Istio ServiceEntry.
    ServiceEntry,
}

impl ResourceKind {
    /// All supported kinds.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Gateway,
        ResourceKind::VirtualService,
        ResourceKind::ServiceEntry,
    ];

    /// Look up a kind by its document key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gateway" => Some(Self::Gateway),
            "virtual-service" => Some(Self::VirtualService),
            "service-entry" => Some(Self::ServiceEntry),
            _ => None,
        }
    }

    /// The document key for this kind.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::VirtualService => "virtual-service",
            Self::ServiceEntry => "service-entry",
        }
    }

    /// The collection this kind is published under.
    #[must_use]
    pub const fn type_url_str(self) -> &'static str {
        match self {
            Self::Gateway => TypeUrl::GATEWAY,
            Self::VirtualService => TypeUrl::VIRTUAL_SERVICE,
            Self::ServiceEntry => TypeUrl::SERVICE_ENTRY,
        }
    }

    /// The collection this kind is published under, as a [`TypeUrl`].
    #[must_use]
    pub fn type_url(self) -> TypeUrl {
        TypeUrl::new(self.type_url_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ResourceKind {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| McpError::UnknownResourceType {
            kind: s.to_string(),
        })
    }
}
