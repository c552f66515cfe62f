//! Snapshot loading integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mcp_snapshot::prelude::*;
use mcp_snapshot::types::istio::networking::v1alpha3::{Gateway, ServiceEntry, VirtualService};

fn testdata(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/mcp-source/testdata")
        .join(path)
}

fn load(root: impl Into<PathBuf>, sequence: u64) -> McpResult<Snapshot> {
    let loader = DocumentLoader::new(root, Arc::new(YamlParser::new()));
    build_snapshot(&loader.load()?, &ResourceVersion::from_sequence(sequence))
}

fn gateway_doc(name: &str) -> String {
    format!(
        "apiVersion: networking.istio.io/v1alpha3\nkind: Gateway\nmetadata:\n  name: {name}\nspec:\n  servers:\n  - port:\n      number: 80\n      protocol: HTTP\n    hosts: ['*']\n"
    )
}

fn service_entry_doc(name: &str) -> String {
    format!(
        "apiVersion: networking.istio.io/v1alpha3\nkind: ServiceEntry\nmetadata:\n  name: {name}\nspec:\n  hosts: [{name}.mesh]\n"
    )
}

#[test]
fn read_snapshot_from_file() {
    let snapshot = load(testdata("config/istio-pinger.yaml"), 1).unwrap();
    assert_eq!(snapshot.version(), "1.0");

    let service_entries = snapshot.resources(TypeUrl::SERVICE_ENTRY);
    assert_eq!(service_entries.len(), 1);
    assert_eq!(service_entries[0].name(), "pinger");
    let entry: ServiceEntry = service_entries[0].decode().unwrap();
    assert_eq!(entry.hosts, vec!["istio-pinger.istio"]);

    let virtual_services = snapshot.resources(TypeUrl::VIRTUAL_SERVICE);
    assert_eq!(virtual_services.len(), 1);
    assert_eq!(virtual_services[0].name(), "pinger");
    let vs: VirtualService = virtual_services[0].decode().unwrap();
    assert_eq!(vs.hosts, vec!["pinger.istio.example.com"]);
    let destination = vs.tcp[0].route[0].destination.as_ref().unwrap();
    assert_eq!(destination.host, "istio-pinger.istio");
    assert_eq!(destination.port.as_ref().unwrap().number, 8081);

    let gateways = snapshot.resources(TypeUrl::GATEWAY);
    assert_eq!(gateways.len(), 1);
    assert_eq!(gateways[0].name(), "pinger-gateway");
    let gateway: Gateway = gateways[0].decode().unwrap();
    assert_eq!(gateway.servers[0].hosts[0], "pinger.istio.example.com");
    assert_eq!(gateway.servers[0].port.as_ref().unwrap().number, 9000);
}

#[test]
fn read_snapshot_from_invalid_file() {
    let err = load(testdata("invalid/front-envoy.yaml"), 1).unwrap_err();
    assert!(matches!(err, McpError::Parse { .. }));
}

#[test]
fn read_snapshot_from_directory() {
    let snapshot = load(testdata("config"), 1).unwrap();

    for type_url in [TypeUrl::SERVICE_ENTRY, TypeUrl::VIRTUAL_SERVICE] {
        let mut names: Vec<_> = snapshot.resources(type_url).iter().map(|e| e.name()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["pinger", "test"]);
    }
    assert_eq!(snapshot.resources(TypeUrl::GATEWAY).len(), 2);

    for envelope in snapshot.resources(TypeUrl::SERVICE_ENTRY) {
        let entry: ServiceEntry = envelope.decode().unwrap();
        assert!(["istio-pinger.istio", "istio-test.istio"].contains(&entry.hosts[0].as_str()));
    }
}

// Scenario A
#[test]
fn single_gateway_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("g1.yaml"), gateway_doc("g1")).unwrap();

    let snapshot = load(dir.path(), 1).unwrap();
    let gateways = snapshot.resources(TypeUrl::GATEWAY);
    assert_eq!(gateways.len(), 1);
    assert_eq!(gateways[0].name(), "g1");
    assert!(snapshot.resources(TypeUrl::VIRTUAL_SERVICE).is_empty());
}

// Scenario B
#[test]
fn two_files_one_group() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.yaml"), service_entry_doc("a")).unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/b.yaml"), service_entry_doc("b")).unwrap();

    let snapshot = load(dir.path(), 1).unwrap();
    let mut names: Vec<_> = snapshot
        .resources(TypeUrl::SERVICE_ENTRY)
        .iter()
        .map(|e| e.name())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn reload_is_idempotent_apart_from_version_and_time() {
    let first = load(testdata("config"), 1).unwrap();
    let second = load(testdata("config"), 2).unwrap();

    assert_eq!(first.version(), "1.0");
    assert_eq!(second.version(), "2.0");

    let mut type_urls: Vec<_> = first.type_urls().cloned().collect();
    type_urls.sort();
    let mut second_urls: Vec<_> = second.type_urls().cloned().collect();
    second_urls.sort();
    assert_eq!(type_urls, second_urls);

    for type_url in &type_urls {
        let bodies = |s: &Snapshot| {
            let mut pairs: Vec<_> = s
                .resources(type_url.as_str())
                .iter()
                .map(|e| (e.name().to_string(), e.body().clone()))
                .collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            pairs
        };
        assert_eq!(bodies(&first), bodies(&second));
    }
}

#[test]
fn destination_rules_are_not_publishable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("dr.yaml"),
        "apiVersion: networking.istio.io/v1alpha3\nkind: DestinationRule\nmetadata:\n  name: reviews\nspec:\n  host: reviews\n",
    )
    .unwrap();

    let err = load(dir.path(), 1).unwrap_err();
    assert!(matches!(err, McpError::UnknownResourceType { .. }));
}
