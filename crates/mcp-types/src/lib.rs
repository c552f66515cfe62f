//! # mcp-types
//!
//! Protobuf message types for the Istio configuration payloads served by the
//! snapshot source.
//!
//! The messages are hand-maintained prost structs covering the subset of the
//! Istio `networking.v1alpha3` API this source understands. They deserialize
//! from the `spec` section of a YAML document and encode to a
//! [`prost_types::Any`] for publication.
//!
//! Every message implements [`prost::Name`] with its full `type.googleapis.com`
//! type URL, and [`mcp_core::TypedObject`] so it can be wrapped directly.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

// Re-export prost types for convenience
pub use prost::Message;
pub use prost_types::Any;

pub mod istio {
    //! Istio API types.

    pub mod networking {
        //! Istio traffic management types.

        pub mod v1alpha3 {
            //! Networking v1alpha3 API.

            use std::collections::HashMap;

            use mcp_core::{BoxError, TypeUrl, TypedObject};

            const PACKAGE: &str = "istio.networking.v1alpha3";

            /// Load balancer listening at the edge of the mesh.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct Gateway {
                /// Servers exposed by this gateway.
                #[prost(message, repeated, tag = "1")]
                pub servers: Vec<Server>,
                /// Workload labels selecting the gateway pods.
                #[prost(map = "string, string", tag = "2")]
                pub selector: HashMap<String, String>,
            }

            /// A port and the hosts exposed on it.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct Server {
                /// Port the proxy listens on.
                #[prost(message, optional, tag = "1")]
                pub port: Option<Port>,
                /// Hosts exposed by this server.
                #[prost(string, repeated, tag = "2")]
                pub hosts: Vec<String>,
                /// Address the listener binds to.
                #[prost(string, tag = "3")]
                pub bind: String,
                /// Optional server name.
                #[prost(string, tag = "4")]
                pub name: String,
            }

            /// A network port.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct Port {
                /// Port number.
                #[prost(uint32, tag = "1")]
                pub number: u32,
                /// Protocol, e.g. `HTTP` or `TCP`.
                #[prost(string, tag = "2")]
                pub protocol: String,
                /// Port name.
                #[prost(string, tag = "3")]
                pub name: String,
                /// Port on the endpoint, when it differs from `number`.
                #[prost(uint32, tag = "4")]
                pub target_port: u32,
            }

            /// Routing rules applied when a host is addressed.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct VirtualService {
                /// Destination hosts the rules apply to.
                #[prost(string, repeated, tag = "1")]
                pub hosts: Vec<String>,
                /// Gateways and sidecars applying the rules.
                #[prost(string, repeated, tag = "2")]
                pub gateways: Vec<String>,
                /// HTTP routes.
                #[prost(message, repeated, tag = "3")]
                pub http: Vec<HttpRoute>,
                /// Opaque TCP routes.
                #[prost(message, repeated, tag = "4")]
                pub tcp: Vec<TcpRoute>,
                /// Namespaces the service is exported to.
                #[prost(string, repeated, tag = "5")]
                pub export_to: Vec<String>,
            }

            /// HTTP routing rule.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct HttpRoute {
                /// Route name.
                #[prost(string, tag = "1")]
                pub name: String,
                /// Weighted destinations.
                #[prost(message, repeated, tag = "2")]
                pub route: Vec<RouteDestination>,
            }

            /// TCP routing rule.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct TcpRoute {
                /// Weighted destinations.
                #[prost(message, repeated, tag = "1")]
                pub route: Vec<RouteDestination>,
            }

            /// A weighted destination.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct RouteDestination {
                /// Where traffic is sent.
                #[prost(message, optional, tag = "1")]
                pub destination: Option<Destination>,
                /// Share of traffic, in percent.
                #[prost(int32, tag = "2")]
                pub weight: i32,
            }

            /// A service in the registry.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct Destination {
                /// Registry host name.
                #[prost(string, tag = "1")]
                pub host: String,
                /// Named subset of the service.
                #[prost(string, tag = "2")]
                pub subset: String,
                /// Port on the host.
                #[prost(message, optional, tag = "3")]
                pub port: Option<PortSelector>,
            }

            /// Selects a port by number.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct PortSelector {
                /// Port number.
                #[prost(uint32, tag = "1")]
                pub number: u32,
            }

            /// Adds an entry to the mesh service registry.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct ServiceEntry {
                /// Hosts of the service.
                #[prost(string, repeated, tag = "1")]
                pub hosts: Vec<String>,
                /// Virtual IP addresses.
                #[prost(string, repeated, tag = "2")]
                pub addresses: Vec<String>,
                /// Ports of the service.
                #[prost(message, repeated, tag = "3")]
                pub ports: Vec<Port>,
                /// `MESH_EXTERNAL` or `MESH_INTERNAL`.
                #[prost(string, tag = "4")]
                pub location: String,
                /// `NONE`, `STATIC` or `DNS`.
                #[prost(string, tag = "5")]
                pub resolution: String,
                /// Statically declared endpoints.
                #[prost(message, repeated, tag = "6")]
                pub endpoints: Vec<WorkloadEntry>,
                /// Namespaces the entry is exported to.
                #[prost(string, repeated, tag = "7")]
                pub export_to: Vec<String>,
            }

            /// A non-Kubernetes workload endpoint.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct WorkloadEntry {
                /// Endpoint address.
                #[prost(string, tag = "1")]
                pub address: String,
                /// Port name to number mapping.
                #[prost(map = "string, uint32", tag = "2")]
                pub ports: HashMap<String, u32>,
                /// Endpoint labels.
                #[prost(map = "string, string", tag = "3")]
                pub labels: HashMap<String, String>,
            }

            /// Policies applied after routing.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct DestinationRule {
                /// Registry host name.
                #[prost(string, tag = "1")]
                pub host: String,
                /// Named versions of the service.
                #[prost(message, repeated, tag = "2")]
                pub subsets: Vec<Subset>,
            }

            /// A named set of endpoints.
            #[derive(Clone, PartialEq, prost::Message, serde::Deserialize)]
            #[serde(default, rename_all = "camelCase")]
            pub struct Subset {
                /// Subset name.
                #[prost(string, tag = "1")]
                pub name: String,
                /// Labels selecting the endpoints.
                #[prost(map = "string, string", tag = "2")]
                pub labels: HashMap<String, String>,
            }

            macro_rules! typed_object {
                ($($ty:ident => $type_url:expr;)*) => {$(
                    impl prost::Name for $ty {
                        const NAME: &'static str = stringify!($ty);
                        const PACKAGE: &'static str = PACKAGE;

                        fn type_url() -> String {
                            $type_url.to_string()
                        }
                    }

                    impl TypedObject for $ty {
                        fn type_url(&self) -> &str {
                            $type_url
                        }

                        fn encode(&self) -> Result<prost_types::Any, BoxError> {
                            Ok(prost_types::Any::from_msg(self)?)
                        }

                        fn as_any(&self) -> &dyn std::any::Any {
                            self
                        }
                    }
                )*};
            }

            typed_object! {
                Gateway => TypeUrl::GATEWAY;
                VirtualService => TypeUrl::VIRTUAL_SERVICE;
                ServiceEntry => TypeUrl::SERVICE_ENTRY;
                DestinationRule => TypeUrl::DESTINATION_RULE;
            }
        }
    }
}
