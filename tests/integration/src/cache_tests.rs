//! Cache integration tests.

use std::sync::Arc;
use std::time::Duration;

use mcp_snapshot::prelude::*;
use mcp_snapshot::types::istio::networking::v1alpha3::ServiceEntry;
use mcp_snapshot::source::{NamedObject, ResourceWrapper};

fn service_entries(names: &[&str]) -> Vec<ResourceEnvelope> {
    let objects: Vec<_> = names
        .iter()
        .map(|name| {
            NamedObject::new(
                *name,
                Arc::new(ServiceEntry {
                    hosts: vec![format!("{name}.mesh")],
                    ..Default::default()
                }) as BoxObject,
            )
        })
        .collect();
    ResourceWrapper::new().wrap_all(&objects).unwrap()
}

fn snapshot(sequence: u64, names: &[&str]) -> Snapshot {
    Snapshot::builder()
        .version(ResourceVersion::from_sequence(sequence))
        .resources(TypeUrl::SERVICE_ENTRY, service_entries(names))
        .build()
}

#[test]
fn cache_basic_operations() {
    let cache = SnapshotCache::new();
    cache.publish(snapshot(1, &["a"]));

    let response = cache.current(TypeUrl::SERVICE_ENTRY);
    assert_eq!(response.version(), "1.0");
    assert_eq!(response.resources()[0].name(), "a");

    let entry: ServiceEntry = response.resources()[0].decode().unwrap();
    assert_eq!(entry.hosts, vec!["a.mesh"]);
}

#[test]
fn every_served_collection_is_answerable() {
    let cache = SnapshotCache::new();
    cache.publish(snapshot(1, &["a"]));

    for type_url in TypeUrl::collections() {
        let response = cache.current(type_url.as_str());
        if type_url.as_str() == TypeUrl::SERVICE_ENTRY {
            assert_eq!(response.version(), "1.0");
        } else {
            assert_eq!(response.version(), "");
            assert!(response.resources().is_empty());
        }
    }
}

#[test]
fn cache_stats_tracking() {
    let cache = SnapshotCache::new();
    cache.publish(snapshot(1, &["a"]));

    let _stale = cache.watch(TypeUrl::SERVICE_ENTRY, "");
    let waiting = cache.watch(TypeUrl::SERVICE_ENTRY, "1.0");
    cache.current(TypeUrl::SERVICE_ENTRY);
    cache.cancel(waiting.id());

    let stats = cache.stats();
    assert_eq!(stats.snapshots_published(), 1);
    assert_eq!(stats.current_reads(), 1);
    assert_eq!(stats.immediate_responses(), 1);
    assert_eq!(stats.watches_registered(), 1);
    assert_eq!(stats.watches_cancelled(), 1);
    assert!((stats.immediate_rate() - 0.5).abs() < 0.01);
}

// Scenario C: a caught-up watch fires once with the full updated group.
#[tokio::test]
async fn watch_receives_full_updated_group() {
    let cache = SnapshotCache::new();
    cache.publish(snapshot(1, &["a"]));

    let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, "1.0");
    cache.publish(snapshot(2, &["a", "b"]));

    let response = tokio::time::timeout(Duration::from_secs(1), watch.recv())
        .await
        .expect("watch should resolve")
        .expect("watch should not be cancelled");

    assert_eq!(response.version(), "2.0");
    let mut names: Vec<_> = response.group().names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b"]);

    cache.publish(snapshot(3, &["a", "b", "c"]));
    assert!(watch.recv().await.is_none());
}

#[tokio::test]
async fn cache_multiple_watches() {
    let cache = SnapshotCache::new();
    cache.publish(snapshot(1, &["a"]));

    let mut watch1 = cache.watch(TypeUrl::SERVICE_ENTRY, "1.0");
    let mut watch2 = cache.watch(TypeUrl::SERVICE_ENTRY, "1.0");
    assert_eq!(cache.watch_count(TypeUrl::SERVICE_ENTRY), 2);

    cache.publish(snapshot(2, &["a"]));

    let r1 = tokio::time::timeout(Duration::from_secs(1), watch1.recv()).await;
    let r2 = tokio::time::timeout(Duration::from_secs(1), watch2.recv()).await;

    assert_eq!(r1.unwrap().unwrap().version(), "2.0");
    assert_eq!(r2.unwrap().unwrap().version(), "2.0");
    assert_eq!(cache.stats().watches_fulfilled(), 2);
}

#[test]
fn cache_cancel_watch() {
    let cache = SnapshotCache::new();
    cache.publish(snapshot(1, &["a"]));

    let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, "1.0");
    assert_eq!(cache.watch_count(TypeUrl::SERVICE_ENTRY), 1);

    assert!(cache.cancel(watch.id()));
    assert_eq!(cache.watch_count(TypeUrl::SERVICE_ENTRY), 0);

    cache.publish(snapshot(2, &["a", "b"]));
    assert!(watch.try_recv().is_err());
    assert!(watch.is_terminated());
}

#[test]
fn removed_collection_wakes_waiting_watch() {
    let cache = SnapshotCache::new();
    cache.publish(snapshot(1, &["a"]));

    let mut watch = cache.watch(TypeUrl::SERVICE_ENTRY, "1.0");
    cache.publish(Snapshot::builder().version(ResourceVersion::from_sequence(2)).build());

    let response = watch.try_recv().unwrap();
    assert_eq!(response.version(), "2.0");
    assert!(response.resources().is_empty());
}

#[test]
fn cache_concurrent_access() {
    use std::thread;

    let cache = Arc::new(SnapshotCache::new());
    let mut handles = vec![];

    // One publisher, many readers and watchers
    {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 1..=100u64 {
                cache.publish(snapshot(i, &["a"]));
            }
        }));
    }
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                let current = cache.current(TypeUrl::SERVICE_ENTRY);
                let watch = cache.watch(TypeUrl::SERVICE_ENTRY, current.version());
                cache.cancel(watch.id());
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.version(), "100.0");
    assert_eq!(cache.total_watch_count(), 0);
}
