//! Change watcher integration tests.
//!
//! These drive a real filesystem subscription, so every file is written
//! elsewhere and renamed into the watched directory to appear atomically.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use mcp_snapshot::prelude::*;
use mcp_snapshot::types::istio::networking::v1alpha3::ServiceEntry;
use tempfile::TempDir;
use tokio::sync::broadcast;

const TIMEOUT: Duration = Duration::from_secs(10);

fn testdata(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/mcp-source/testdata")
        .join(path)
}

/// A watched directory plus a sibling staging directory.
struct Fixture {
    watched: TempDir,
    staging: TempDir,
    cache: Arc<SnapshotCache>,
    watcher: ConfigWatcher,
    events: broadcast::Receiver<RebuildEvent>,
}

impl Fixture {
    fn new() -> Self {
        let watched = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let cache = Arc::new(SnapshotCache::new());
        let watcher =
            ConfigWatcher::new(SourceConfig::new(watched.path()), Arc::clone(&cache)).unwrap();
        let events = watcher.subscribe();
        Self {
            watched,
            staging,
            cache,
            watcher,
            events,
        }
    }

    fn install(&self, name: &str, content: &str) {
        let staged = self.staging.path().join(name);
        fs::write(&staged, content).unwrap();
        fs::rename(&staged, self.watched.path().join(name)).unwrap();
    }

    fn install_testdata(&self, name: &str, source: &str) {
        self.install(name, &fs::read_to_string(testdata(source)).unwrap());
    }

    fn remove(&self, name: &str) {
        fs::remove_file(self.watched.path().join(name)).unwrap();
    }

    async fn next_event(&mut self) -> RebuildEvent {
        tokio::time::timeout(TIMEOUT, self.events.recv())
            .await
            .expect("timed out waiting for rebuild")
            .expect("rebuild events closed")
    }
}

async fn resolve(watch: &mut Watch) -> WatchResponse {
    tokio::time::timeout(TIMEOUT, watch.recv())
        .await
        .expect("timed out waiting for watch")
        .expect("watch cancelled")
}

fn names(response: &WatchResponse) -> Vec<String> {
    let mut names: Vec<_> = response.group().names().map(str::to_string).collect();
    names.sort();
    names
}

#[tokio::test(flavor = "multi_thread")]
async fn follow_service_entries_through_changes() {
    let fixture = Fixture::new();
    let cache = Arc::clone(&fixture.cache);

    // Nothing loaded yet: the collection has never been seen.
    let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, "");

    // add one file
    fixture.install_testdata("istio-pinger.yaml", "config/istio-pinger.yaml");
    let response = resolve(&mut watch).await;
    assert_eq!(names(&response), vec!["pinger"]);
    let entry: ServiceEntry = response.resources()[0].decode().unwrap();
    assert_eq!(entry.hosts, vec!["istio-pinger.istio"]);

    // add second file
    let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, response.version());
    fixture.install_testdata("istio-test.yaml", "config/sub/istio-test.yaml");
    let response = resolve(&mut watch).await;
    assert_eq!(names(&response), vec!["pinger", "test"]);

    // remove first file
    let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, response.version());
    fixture.remove("istio-pinger.yaml");
    let response = resolve(&mut watch).await;
    assert_eq!(names(&response), vec!["test"]);
    let entry: ServiceEntry = response.resources()[0].decode().unwrap();
    assert_eq!(entry.hosts, vec!["istio-test.istio"]);

    // remove second file
    let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, response.version());
    fixture.remove("istio-test.yaml");
    let response = resolve(&mut watch).await;
    assert!(response.resources().is_empty());
    assert_ne!(response.version(), "");

    fixture.watcher.stop();
}

// Scenario C
#[tokio::test(flavor = "multi_thread")]
async fn added_file_resolves_caught_up_watch() {
    let mut fixture = Fixture::new();
    fixture.install_testdata("istio-pinger.yaml", "config/istio-pinger.yaml");
    let version = match fixture.next_event().await {
        RebuildEvent::Published { version } => version,
        other => panic!("unexpected event: {other:?}"),
    };
    assert_eq!(version, "2.0");

    let mut watch = fixture.cache.watch(TypeUrl::SERVICE_ENTRY, &version);
    fixture.install_testdata("istio-test.yaml", "config/sub/istio-test.yaml");

    let response = resolve(&mut watch).await;
    assert_eq!(response.version(), "3.0");
    assert_eq!(names(&response), vec!["pinger", "test"]);
    assert!(watch.recv().await.is_none());
}

// Scenario D
#[tokio::test(flavor = "multi_thread")]
async fn deleting_last_gateway_empties_group() {
    let mut fixture = Fixture::new();
    fixture.install_testdata("istio-pinger.yaml", "config/istio-pinger.yaml");
    assert!(matches!(
        fixture.next_event().await,
        RebuildEvent::Published { .. }
    ));
    let before = fixture.cache.current(TypeUrl::GATEWAY);
    assert_eq!(before.resources().len(), 1);

    let mut watch = fixture.cache.watch(TypeUrl::GATEWAY, before.version());
    fixture.remove("istio-pinger.yaml");

    let response = resolve(&mut watch).await;
    assert!(response.resources().is_empty());
    let before_seq = ResourceVersion::new(before.version()).sequence();
    assert!(ResourceVersion::new(response.version()).sequence() > before_seq);
}

// Scenario E
#[tokio::test(flavor = "multi_thread")]
async fn unparsable_file_keeps_previous_snapshot() {
    let mut fixture = Fixture::new();
    fixture.install_testdata("istio-pinger.yaml", "config/istio-pinger.yaml");
    assert!(matches!(
        fixture.next_event().await,
        RebuildEvent::Published { .. }
    ));

    let before: Vec<_> = TypeUrl::collections()
        .into_iter()
        .map(|t| fixture.cache.current(t.as_str()))
        .collect();
    let caught_up = fixture.cache.current(TypeUrl::SERVICE_ENTRY);
    let mut watch = fixture.cache.watch(TypeUrl::SERVICE_ENTRY, caught_up.version());

    fixture.install_testdata("front-envoy.yaml", "invalid/front-envoy.yaml");

    match fixture.next_event().await {
        RebuildEvent::Failed { error, .. } => {
            assert!(error.contains("front-envoy.yaml"), "{error}");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    for (type_url, previous) in TypeUrl::collections().into_iter().zip(&before) {
        let current = fixture.cache.current(type_url.as_str());
        assert_eq!(current.version(), previous.version(), "{type_url}");
        assert_eq!(current.resources(), previous.resources(), "{type_url}");
    }
    assert!(watch.try_recv().is_err());

    // A later fix publishes the next version.
    fixture.remove("front-envoy.yaml");
    let response = resolve(&mut watch).await;
    assert_eq!(response.version(), "3.0");
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_leaves_pending_watches_registered() {
    let fixture = Fixture::new();
    let _watch = fixture.cache.watch(TypeUrl::GATEWAY, "");

    fixture.watcher.stop();
    fixture.watcher.stop();

    assert_eq!(fixture.watcher.state(), WatcherState::Stopped);
    assert_eq!(fixture.cache.watch_count(TypeUrl::GATEWAY), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn single_file_root_survives_editor_saves() {
    let watched = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();
    let root = watched.path().join("istio-pinger.yaml");
    fs::copy(testdata("config/istio-pinger.yaml"), &root).unwrap();

    let cache = Arc::new(SnapshotCache::new());
    let watcher = ConfigWatcher::new(SourceConfig::new(&root), Arc::clone(&cache)).unwrap();
    let mut response = cache.current(TypeUrl::SERVICE_ENTRY);
    assert_eq!(names(&response), vec!["pinger"]);

    // each save writes a new file and renames it over the old one
    let sources = [
        "config/sub/istio-test.yaml",
        "config/istio-pinger.yaml",
        "config/sub/istio-test.yaml",
    ];
    for source in sources {
        let expected = if source.ends_with("istio-test.yaml") {
            "test"
        } else {
            "pinger"
        };
        let staged = staging.path().join("save.yaml");
        fs::copy(testdata(source), &staged).unwrap();
        fs::rename(&staged, &root).unwrap();

        while names(&response) != vec![expected] {
            let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, response.version());
            response = resolve(&mut watch).await;
        }
    }

    assert!(ResourceVersion::new(response.version()).sequence() >= 4);
    watcher.stop();
}

#[tokio::test(flavor = "multi_thread")]
async fn restarted_watcher_continues_the_version_sequence() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(
        testdata("config/istio-pinger.yaml"),
        dir.path().join("istio-pinger.yaml"),
    )
    .unwrap();
    let cache = Arc::new(SnapshotCache::new());

    let first = ConfigWatcher::new(SourceConfig::new(dir.path()), Arc::clone(&cache)).unwrap();
    assert_eq!(cache.version(), "1.0");
    let mut watch = cache.watch(TypeUrl::GATEWAY, "1.0");
    first.stop();
    drop(first);

    let second = ConfigWatcher::new(SourceConfig::new(dir.path()), Arc::clone(&cache)).unwrap();
    let response = resolve(&mut watch).await;
    assert_eq!(response.version(), "2.0");
    assert_eq!(cache.version(), "2.0");
    second.stop();
}
