//! Change watcher that rebuilds and publishes snapshots.
//!
//! [`ConfigWatcher`] performs the initial load when constructed, then
//! subscribes to filesystem events under the document root. Every relevant
//! event triggers a full reload on the blocking pool; a successful reload is
//! published to the [`SnapshotCache`] at the next version, a failed one is
//! logged and the previous snapshot stays in place.
//!
//! Events that arrive while a rebuild is pending or running are coalesced
//! into the next rebuild.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mcp_cache::SnapshotCache;
//! use mcp_source::{ConfigWatcher, SourceConfig};
//!
//! # async fn run() -> mcp_core::Result<()> {
//! let cache = Arc::new(SnapshotCache::new());
//! let watcher = ConfigWatcher::new(SourceConfig::new("/etc/mesh"), Arc::clone(&cache))?;
//! assert_eq!(cache.version(), "1.0");
//!
//! // ... serve the cache ...
//!
//! watcher.stop();
//! # Ok(())
//! # }
//! ```

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use mcp_cache::{Cache, Snapshot, SnapshotCache};
use mcp_core::{McpError, ResourceVersion, Result};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, trace, warn};

use crate::builder::build_snapshot;
use crate::config::SourceConfig;
use crate::loader::DocumentLoader;
use crate::parser::{DocumentParser, YamlParser};

/// Capacity of the rebuild event broadcast.
const REBUILD_EVENT_CAPACITY: usize = 16;

/// Lifecycle state of a [`ConfigWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Waiting for filesystem events.
    Idle,
    /// Reloading the document source.
    Rebuilding,
    /// Stopped; no further events are processed.
    Stopped,
}

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Rebuilding => f.write_str("rebuilding"),
            Self::Stopped => f.write_str("stopped"),
        }
    }
}

/// Outcome of one rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildEvent {
    /// A snapshot was published at `version`.
    Published {
        /// Version of the published snapshot.
        version: String,
    },
    /// The rebuild failed and the previous snapshot was kept.
    Failed {
        /// Version the rebuild would have published.
        version: String,
        /// Rendered error.
        error: String,
    },
}

/// Handles owned while the watcher runs.
struct Running {
    /// Filesystem subscription; dropping it releases the subscription.
    watcher: RecommendedWatcher,
    shutdown: oneshot::Sender<()>,
}

/// Watches a document root and keeps a [`SnapshotCache`] up to date.
pub struct ConfigWatcher {
    cache: Arc<SnapshotCache>,
    loader: DocumentLoader,
    state: Arc<watch::Sender<WatcherState>>,
    events: broadcast::Sender<RebuildEvent>,
    running: Mutex<Option<Running>>,
}

impl fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigWatcher")
            .field("root", &self.loader.root())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ConfigWatcher {
    /// Start watching with the YAML document parser.
    ///
    /// See [`with_parser`](Self::with_parser).
    pub fn new(config: SourceConfig, cache: Arc<SnapshotCache>) -> Result<Self> {
        Self::with_parser(config, cache, Arc::new(YamlParser::new()))
    }

    /// Load the source, publish it and start watching.
    ///
    /// The initial snapshot is published at the version following the one
    /// `cache` already serves, so `1.0` for a fresh cache. The initial load
    /// runs on the calling thread. If it fails, nothing is published and the
    /// error is returned. Must be called from within a tokio runtime.
    pub fn with_parser(
        config: SourceConfig,
        cache: Arc<SnapshotCache>,
        parser: Arc<dyn DocumentParser>,
    ) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            McpError::Configuration(format!("config watcher needs a tokio runtime: {e}"))
        })?;

        let loader = DocumentLoader::new(config.root.clone(), parser);
        let version = ResourceVersion::new(cache.version()).next();
        let groups = loader.load()?;
        cache.publish(build_snapshot(&groups, &version)?);
        info!(root = %config.root.display(), version = %version, "initial snapshot published");

        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);
        let watcher = subscribe(loader.root(), event_tx)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (state, _) = watch::channel(WatcherState::Idle);
        let state = Arc::new(state);
        let (events, _) = broadcast::channel(REBUILD_EVENT_CAPACITY);

        let task = RebuildTask {
            cache: Arc::clone(&cache),
            loader: loader.clone(),
            state: Arc::clone(&state),
            events: events.clone(),
            version,
        };
        runtime.spawn(task.run(event_rx, shutdown_rx));

        Ok(Self {
            cache,
            loader,
            state,
            events,
            running: Mutex::new(Some(Running {
                watcher,
                shutdown: shutdown_tx,
            })),
        })
    }

    /// The cache this watcher publishes to.
    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// The document root.
    pub fn root(&self) -> &Path {
        self.loader.root()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    /// Receiver following lifecycle state changes.
    pub fn state_receiver(&self) -> watch::Receiver<WatcherState> {
        self.state.subscribe()
    }

    /// Subscribe to the outcome of every subsequent rebuild.
    pub fn subscribe(&self) -> broadcast::Receiver<RebuildEvent> {
        self.events.subscribe()
    }

    /// Stop watching.
    ///
    /// Releases the filesystem subscription and ends the rebuild task. A
    /// rebuild that has not published by the time this returns is
    /// discarded. Pending cache watches are left in place. Calling this more
    /// than once has no effect.
    pub fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(running) = running else {
            trace!("config watcher already stopped");
            return;
        };

        self.state.send_replace(WatcherState::Stopped);
        let _ = running.shutdown.send(());
        drop(running.watcher);
        info!(root = %self.loader.root().display(), "config watcher stopped");
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Create the filesystem subscription feeding `events`.
///
/// A directory root is watched recursively. A file root is watched through
/// its parent directory, keeping only events that name the file, so the
/// subscription survives the file being replaced by a rename.
fn subscribe(root: &Path, events: mpsc::Sender<()>) -> Result<RecommendedWatcher> {
    let (target, mode, file_name) = if root.is_file() {
        let parent = match root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        (parent, RecursiveMode::NonRecursive, root.file_name().map(OsString::from))
    } else {
        (root, RecursiveMode::Recursive, None)
    };

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(event) if is_relevant(&event.kind) && names_file(&event, file_name.as_deref()) => {
                trace!(kind = ?event.kind, paths = ?event.paths, "filesystem event");
                // A full queue already guarantees a rebuild that will observe
                // this change.
                let _ = events.try_send(());
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "filesystem watch error"),
        }
    })
    .map_err(|e| McpError::watch("failed to create filesystem watcher", e))?;

    watcher
        .watch(target, mode)
        .map_err(|e| McpError::watch(format!("failed to watch {}", target.display()), e))?;

    debug!(root = %root.display(), watched = %target.display(), ?mode, "watching document root");
    Ok(watcher)
}

/// Whether `event` concerns the watched file. Always true without a filter.
fn names_file(event: &Event, file_name: Option<&OsStr>) -> bool {
    match file_name {
        None => true,
        Some(name) => event.paths.iter().any(|path| path.file_name() == Some(name)),
    }
}

/// Whether an event can change the loaded documents.
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

/// State owned by the background rebuild task.
struct RebuildTask {
    cache: Arc<SnapshotCache>,
    loader: DocumentLoader,
    state: Arc<watch::Sender<WatcherState>>,
    events: broadcast::Sender<RebuildEvent>,
    /// Version of the last published snapshot.
    version: ResourceVersion,
}

impl RebuildTask {
    async fn run(mut self, mut events: mpsc::Receiver<()>, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                received = events.recv() => {
                    if received.is_none() {
                        break;
                    }
                }
            }

            let mut coalesced = 0usize;
            while events.try_recv().is_ok() {
                coalesced += 1;
            }
            if coalesced > 0 {
                trace!(coalesced, "coalesced filesystem events");
            }

            if !self.set_state(WatcherState::Rebuilding) {
                break;
            }
            self.rebuild().await;
            if !self.set_state(WatcherState::Idle) {
                break;
            }
        }
        debug!("rebuild task finished");
    }

    async fn rebuild(&mut self) {
        let next = self.version.next();

        let loader = self.loader.clone();
        let version = next.clone();
        let result = tokio::task::spawn_blocking(move || {
            let groups = loader.load()?;
            build_snapshot(&groups, &version)
        })
        .await
        .unwrap_or_else(|e| {
            Err(McpError::Configuration(format!("rebuild task failed: {e}")))
        });

        if self.is_stopped() {
            debug!(version = %next, "discarding rebuild finished after stop");
            return;
        }

        match result {
            Ok(snapshot) => {
                if !self.publish_unless_stopped(snapshot) {
                    debug!(version = %next, "discarding rebuild finished after stop");
                    return;
                }
                self.version = next;
                info!(version = %self.version, "snapshot published");
                let _ = self.events.send(RebuildEvent::Published {
                    version: self.version.to_string(),
                });
            }
            Err(e) => {
                error!(
                    root = %self.loader.root().display(),
                    version = %next,
                    error = %e,
                    "failed to rebuild snapshot; keeping version {}",
                    self.version
                );
                let _ = self.events.send(RebuildEvent::Failed {
                    version: next.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Publish `snapshot` unless the watcher has stopped.
    ///
    /// The publish runs while the state channel is held, so `stop` either
    /// lands before it and wins, or waits for it to finish.
    fn publish_unless_stopped(&self, snapshot: Snapshot) -> bool {
        let mut published = false;
        self.state.send_if_modified(|state| {
            if *state != WatcherState::Stopped {
                self.cache.publish(snapshot);
                published = true;
            }
            false
        });
        published
    }

    fn is_stopped(&self) -> bool {
        *self.state.borrow() == WatcherState::Stopped
    }

    /// Move to `next` unless stopped. Returns `false` once stopped.
    fn set_state(&self, next: WatcherState) -> bool {
        let mut stopped = false;
        self.state.send_if_modified(|state| {
            if *state == WatcherState::Stopped {
                stopped = true;
                false
            } else {
                let changed = *state != next;
                *state = next;
                changed
            }
        });
        !stopped
    }
}
