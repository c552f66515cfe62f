//! Type URL handling for served collections.
//!
//! Each collection served to consumers is identified by the type URL of the
//! protobuf message it carries. This module provides the constants for the
//! Istio collections and the list advertised to the publishing layer.

use std::borrow::Borrow;
use std::fmt;

/// Type URL wrapper identifying one collection.
///
/// # Example
///
/// ```rust
/// use mcp_core::TypeUrl;
///
/// let gateways = TypeUrl::new(TypeUrl::GATEWAY);
/// assert_eq!(gateways.short_name(), "Gateway");
/// assert!(gateways.is_valid());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeUrl(String);

impl TypeUrl {
    /// Type URL for Istio Gateway.
    pub const GATEWAY: &'static str = "type.googleapis.com/istio.networking.v1alpha3.Gateway";

    /// Type URL for Istio VirtualService.
    pub const VIRTUAL_SERVICE: &'static str =
        "type.googleapis.com/istio.networking.v1alpha3.VirtualService";

    /// Type URL for Istio DestinationRule.
    pub const DESTINATION_RULE: &'static str =
        "type.googleapis.com/istio.networking.v1alpha3.DestinationRule";

    /// Type URL for Istio ServiceEntry.
    pub const SERVICE_ENTRY: &'static str =
        "type.googleapis.com/istio.networking.v1alpha3.ServiceEntry";

    /// Type URL for Istio EnvoyFilter.
    pub const ENVOY_FILTER: &'static str =
        "type.googleapis.com/istio.networking.v1alpha3.EnvoyFilter";

    /// Type URL for mixer HTTPAPISpec.
    pub const HTTP_API_SPEC: &'static str =
        "type.googleapis.com/istio.mixer.v1.config.client.HTTPAPISpec";

    /// Type URL for mixer HTTPAPISpecBinding.
    pub const HTTP_API_SPEC_BINDING: &'static str =
        "type.googleapis.com/istio.mixer.v1.config.client.HTTPAPISpecBinding";

    /// Type URL for mixer QuotaSpec.
    pub const QUOTA_SPEC: &'static str =
        "type.googleapis.com/istio.mixer.v1.config.client.QuotaSpec";

    /// Type URL for mixer QuotaSpecBinding.
    pub const QUOTA_SPEC_BINDING: &'static str =
        "type.googleapis.com/istio.mixer.v1.config.client.QuotaSpecBinding";

    /// Type URL for authentication Policy (also carries MeshPolicy).
    pub const POLICY: &'static str = "type.googleapis.com/istio.authentication.v1alpha1.Policy";

    /// Type URL for rbac ServiceRole.
    pub const SERVICE_ROLE: &'static str = "type.googleapis.com/istio.rbac.v1alpha1.ServiceRole";

    /// Type URL for rbac ServiceRoleBinding.
    pub const SERVICE_ROLE_BINDING: &'static str =
        "type.googleapis.com/istio.rbac.v1alpha1.ServiceRoleBinding";

    /// Type URL for rbac RbacConfig.
    pub const RBAC_CONFIG: &'static str = "type.googleapis.com/istio.rbac.v1alpha1.RbacConfig";

    /// Every collection advertised to consumers.
    ///
    /// Only the collections backed by a [`ResourceKind`](crate::ResourceKind)
    /// are ever populated; the rest are served as empty groups.
    pub const COLLECTIONS: &'static [&'static str] = &[
        Self::GATEWAY,
        Self::VIRTUAL_SERVICE,
        Self::DESTINATION_RULE,
        Self::SERVICE_ENTRY,
        Self::ENVOY_FILTER,
        Self::HTTP_API_SPEC,
        Self::HTTP_API_SPEC_BINDING,
        Self::QUOTA_SPEC,
        Self::QUOTA_SPEC_BINDING,
        Self::POLICY,
        Self::SERVICE_ROLE,
        Self::SERVICE_ROLE_BINDING,
        Self::RBAC_CONFIG,
    ];

    /// Create a new type URL from a string.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// All advertised collections as owned type URLs.
    #[must_use]
    pub fn collections() -> Vec<TypeUrl> {
        Self::COLLECTIONS.iter().map(|url| Self::new(*url)).collect()
    }

    /// Get the type URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the short name from the type URL.
    ///
    /// For example, `type.googleapis.com/istio.networking.v1alpha3.Gateway`
    /// returns `Gateway`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0.rsplit('/').next().and_then(|s| s.rsplit('.').next()).unwrap_or(&self.0)
    }

    /// Check if this is a well-formed type URL.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.starts_with("type.googleapis.com/")
    }

    /// Check if this collection is advertised to consumers.
    #[must_use]
    pub fn is_served(&self) -> bool {
        Self::COLLECTIONS.contains(&self.0.as_str())
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TypeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TypeUrl {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TypeUrl {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<TypeUrl> for String {
    fn from(t: TypeUrl) -> Self {
        t.0
    }
}

impl AsRef<str> for TypeUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}
