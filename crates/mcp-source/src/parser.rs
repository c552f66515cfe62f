//! Document parsing.
//!
//! [`DocumentParser`] turns the content of one file into typed objects keyed
//! by resource-type key. [`YamlParser`] understands multi-document YAML in
//! the Kubernetes custom resource layout:
//!
//! ```yaml
//! apiVersion: networking.istio.io/v1alpha3
//! kind: ServiceEntry
//! metadata:
//!   name: pinger
//! spec:
//!   hosts: [istio-pinger.istio]
//! ```

use std::sync::Arc;

use mcp_core::{BoxObject, TypedObject};
use mcp_types::istio::networking::v1alpha3::{
    DestinationRule, Gateway, ServiceEntry, VirtualService,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// API group whose documents are decoded into typed payloads.
pub const ISTIO_NETWORKING_GROUP: &str = "networking.istio.io";

/// Domain shared by every Istio API group.
pub const ISTIO_DOMAIN: &str = "istio.io";

/// One typed object produced by a parser.
#[derive(Debug, Clone)]
pub struct ParsedObject {
    /// Resource-type key, e.g. `service-entry`.
    pub kind_key: String,
    /// Object name.
    pub name: String,
    /// Decoded payload.
    pub object: BoxObject,
}

/// Errors produced while parsing one file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The content is not valid YAML, or a document is not a mapping.
    #[error("document {index}: {source}")]
    Yaml {
        /// Zero-based position of the document in the file.
        index: usize,
        /// Decoder error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A required field is missing or empty.
    #[error("document {index}: missing {field}")]
    MissingField {
        /// Zero-based position of the document in the file.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The document belongs to an Istio API group but its kind is not
    /// understood.
    #[error("document {index}: unsupported kind {kind} in {group}")]
    UnsupportedKind {
        /// Zero-based position of the document in the file.
        index: usize,
        /// API group.
        group: String,
        /// Document kind.
        kind: String,
    },

    /// The `spec` section does not match the kind's schema.
    #[error("document {index}: invalid {kind} spec: {source}")]
    InvalidSpec {
        /// Zero-based position of the document in the file.
        index: usize,
        /// Document kind.
        kind: String,
        /// Decoder error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Turns file content into typed objects.
pub trait DocumentParser: Send + Sync {
    /// Parse the full content of one file.
    fn parse(&self, content: &str) -> Result<Vec<ParsedObject>, ParseError>;
}

impl<P: DocumentParser + ?Sized> DocumentParser for Arc<P> {
    fn parse(&self, content: &str) -> Result<Vec<ParsedObject>, ParseError> {
        (**self).parse(content)
    }
}

/// Parser for multi-document Istio custom resource YAML.
///
/// Empty documents are skipped. Documents outside the Istio API groups are
/// ignored. Istio documents that cannot be decoded are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    metadata: Option<DocumentMetadata>,
    #[serde(default)]
    spec: serde_yaml::Value,
}

#[derive(Debug, Deserialize)]
struct DocumentMetadata {
    #[serde(default)]
    name: Option<String>,
}

impl DocumentParser for YamlParser {
    fn parse(&self, content: &str) -> Result<Vec<ParsedObject>, ParseError> {
        let mut objects = Vec::new();

        for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
            let value = serde_yaml::Value::deserialize(document)
                .map_err(|source| ParseError::Yaml { index, source })?;
            if value.is_null() {
                continue;
            }

            let document: Document = serde_yaml::from_value(value)
                .map_err(|source| ParseError::Yaml { index, source })?;

            let api_version = non_empty(document.api_version).ok_or(ParseError::MissingField {
                index,
                field: "apiVersion",
            })?;
            let kind = non_empty(document.kind).ok_or(ParseError::MissingField {
                index,
                field: "kind",
            })?;
            let name = non_empty(document.metadata.and_then(|m| m.name)).ok_or(
                ParseError::MissingField {
                    index,
                    field: "metadata.name",
                },
            )?;

            let group = api_version
                .split_once('/')
                .map(|(group, _)| group)
                .unwrap_or_default();
            if !is_istio_group(group) {
                continue;
            }

            let decoded = if group == ISTIO_NETWORKING_GROUP {
                decode_spec(index, &kind, document.spec)
            } else {
                None
            };
            let object = decoded.ok_or_else(|| {
                ParseError::UnsupportedKind {
                    index,
                    group: group.to_string(),
                    kind: kind.clone(),
                }
            })??;

            objects.push(ParsedObject {
                kind_key: kebab_case(&kind),
                name,
                object,
            });
        }

        Ok(objects)
    }
}

/// Decode a spec for a networking kind. `None` if the kind is unknown.
fn decode_spec(
    index: usize,
    kind: &str,
    spec: serde_yaml::Value,
) -> Option<Result<BoxObject, ParseError>> {
    let decoded = match kind {
        "Gateway" => decode::<Gateway>(spec),
        "VirtualService" => decode::<VirtualService>(spec),
        "ServiceEntry" => decode::<ServiceEntry>(spec),
        "DestinationRule" => decode::<DestinationRule>(spec),
        _ => return None,
    };
    Some(decoded.map_err(|source| ParseError::InvalidSpec {
        index,
        kind: kind.to_string(),
        source,
    }))
}

fn decode<T>(spec: serde_yaml::Value) -> Result<BoxObject, serde_yaml::Error>
where
    T: TypedObject + DeserializeOwned + Default + 'static,
{
    let object = if spec.is_null() {
        T::default()
    } else {
        serde_yaml::from_value::<T>(spec)?
    };
    Ok(Arc::new(object))
}

/// `istio.io` itself or any of its subgroups.
fn is_istio_group(group: &str) -> bool {
    group == ISTIO_DOMAIN
        || group
            .strip_suffix(ISTIO_DOMAIN)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// `VirtualService` -> `virtual-service`.
fn kebab_case(kind: &str) -> String {
    let mut out = String::with_capacity(kind.len() + 4);
    for (i, c) in kind.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
