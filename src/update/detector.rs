//! Deployed-version watcher.
//!
//! Plays the update-detection collaborator for a build directory: the
//! deployed `manifest.json` is watched, and the first build that differs
//! from the active one is held as a waiting version and handed to the
//! single subscriber.
//!
//! File events give fast detection; a periodic check on the configured
//! interval covers platforms where events are missed and a build directory
//! that does not exist yet.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::host::{ActivationError, WaitingVersion};
use crate::update::message::ControlMessage;

/// Error type for the version watcher.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid build manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

/// Descriptor of a deployed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub version: String,
    #[serde(default)]
    pub build_id: Option<String>,
}

impl BuildManifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            build_id: None,
        }
    }

    /// Read a manifest from disk.
    pub fn read(path: &Path) -> Result<Self, DetectorError> {
        let content = fs::read_to_string(path).map_err(|source| DetectorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// The currently active version, shared between the detector and the
/// waiting versions it creates. Outlives individual instances.
#[derive(Debug, Clone)]
pub struct VersionSlot {
    active: Arc<ArcSwap<BuildManifest>>,
}

impl VersionSlot {
    pub fn new(active: BuildManifest) -> Self {
        Self {
            active: Arc::new(ArcSwap::from_pointee(active)),
        }
    }

    pub fn current(&self) -> Arc<BuildManifest> {
        self.active.load_full()
    }

    fn activate(&self, manifest: BuildManifest) {
        self.active.store(Arc::new(manifest));
    }
}

/// A newer build waiting to become active.
#[derive(Debug)]
pub struct PendingVersion {
    manifest: BuildManifest,
    slot: VersionSlot,
}

impl PendingVersion {
    pub fn manifest(&self) -> &BuildManifest {
        &self.manifest
    }

    /// Worker side of the message channel.
    fn handle(&self, raw: &str) -> Result<(), ActivationError> {
        match ControlMessage::decode(raw)? {
            ControlMessage::SkipWaiting => {
                if *self.slot.current() == self.manifest {
                    return Err(ActivationError::AlreadyActive(self.manifest.version.clone()));
                }
                self.slot.activate(self.manifest.clone());
                tracing::info!(version = %self.manifest.version, "Waiting version activated");
                Ok(())
            }
        }
    }
}

impl WaitingVersion for PendingVersion {
    fn version(&self) -> &str {
        &self.manifest.version
    }

    fn post_message(&self, message: &ControlMessage) -> Result<(), ActivationError> {
        let raw = message.encode()?;
        self.handle(&raw)
    }
}

/// Watches the deployed build manifest for a new version.
pub struct VersionWatcher {
    path: PathBuf,
    slot: VersionSlot,
    poll_interval: Duration,
    subscriber: Option<oneshot::Sender<PendingVersion>>,
}

impl VersionWatcher {
    /// Create a new VersionWatcher.
    ///
    /// Returns the watcher and the one-shot subscription for the update signal.
    pub fn new(
        path: &Path,
        slot: VersionSlot,
        poll_interval: Duration,
    ) -> (Self, oneshot::Receiver<PendingVersion>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                path: path.to_path_buf(),
                slot,
                poll_interval,
                subscriber: Some(tx),
            },
            rx,
        )
    }

    /// Compare the deployed manifest with the active version.
    ///
    /// Returns true if a waiting version was delivered by this call.
    pub fn check(&mut self) -> bool {
        if self.subscriber.is_none() {
            return false;
        }

        let deployed = match BuildManifest::read(&self.path) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(path = ?self.path, error = %e, "Build manifest unreadable, skipping check");
                return false;
            }
        };

        let active = self.slot.current();
        if *active == deployed {
            return false;
        }

        let Some(tx) = self.subscriber.take() else {
            return false;
        };
        tracing::info!(
            active = %active.version,
            deployed = %deployed.version,
            "New build detected, holding as waiting"
        );
        let pending = PendingVersion {
            manifest: deployed,
            slot: self.slot.clone(),
        };
        if tx.send(pending).is_err() {
            tracing::debug!("Update subscriber is gone");
        }
        true
    }

    /// True once nothing more can be delivered.
    fn is_finished(&self) -> bool {
        self.subscriber.as_ref().map_or(true, |tx| tx.is_closed())
    }

    /// Check once, then keep watching until a version is delivered.
    ///
    /// Must be called inside a tokio runtime. Watching stops when the
    /// returned guard is dropped.
    pub fn run(self) -> WatchGuard {
        let poll_interval = self.poll_interval.max(MIN_POLL_INTERVAL);
        let path = self.path.clone();
        let shared = Arc::new(Mutex::new(self));
        check_shared(&shared);

        let events = match watch_events(&path, shared.clone()) {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "File events unavailable, relying on periodic checks");
                None
            }
        };
        let poller = tokio::spawn(poll(shared, poll_interval));

        tracing::info!(path = ?path, poll_interval_ms = poll_interval.as_millis() as u64, "Version watcher started");
        WatchGuard {
            _events: events,
            poller,
        }
    }
}

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Keeps a running `VersionWatcher` alive.
pub struct WatchGuard {
    _events: Option<RecommendedWatcher>,
    poller: JoinHandle<()>,
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

fn check_shared(watcher: &Mutex<VersionWatcher>) -> bool {
    watcher.lock().unwrap_or_else(PoisonError::into_inner).check()
}

fn is_finished(watcher: &Mutex<VersionWatcher>) -> bool {
    watcher.lock().unwrap_or_else(PoisonError::into_inner).is_finished()
}

async fn poll(watcher: Arc<Mutex<VersionWatcher>>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick is immediate and `run` has already checked.
    ticker.tick().await;

    while !is_finished(&watcher) {
        ticker.tick().await;
        check_shared(&watcher);
    }
    tracing::debug!("Version polling stopped");
}

/// Subscribe to file events in the manifest's directory.
fn watch_events(
    path: &Path,
    watcher: Arc<Mutex<VersionWatcher>>,
) -> Result<RecommendedWatcher, DetectorError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path.file_name().map(|n| n.to_os_string());

    let mut events = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let relevant = (event.kind.is_modify() || event.kind.is_create())
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if relevant {
                    check_shared(&watcher);
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        },
        Config::default(),
    )?;

    events.watch(&dir, RecursiveMode::NonRecursive)?;
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(path: &Path, version: &str) {
        fs::write(path, serde_json::to_string(&BuildManifest::new(version)).unwrap()).unwrap();
    }

    #[test]
    fn test_manifest_parse() {
        let m: BuildManifest = serde_json::from_str(r#"{"version":"1.2.0","build_id":"abc"}"#).unwrap();
        assert_eq!(m.version, "1.2.0");
        assert_eq!(m.build_id.as_deref(), Some("abc"));

        let m: BuildManifest = serde_json::from_str(r#"{"version":"1.2.0"}"#).unwrap();
        assert!(m.build_id.is_none());
    }

    #[test]
    fn test_same_version_is_not_an_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        write_manifest(&path, "1.0.0");

        let slot = VersionSlot::new(BuildManifest::new("1.0.0"));
        let (mut watcher, mut rx) = VersionWatcher::new(&path, slot, Duration::from_secs(1));
        assert!(!watcher.check());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_manifest_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let slot = VersionSlot::new(BuildManifest::new("1.0.0"));
        let (mut watcher, _rx) =
            VersionWatcher::new(&dir.path().join("manifest.json"), slot, Duration::from_secs(1));
        assert!(!watcher.check());
    }

    #[test]
    fn test_delivers_only_first_new_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let slot = VersionSlot::new(BuildManifest::new("1.0.0"));
        let (mut watcher, mut rx) = VersionWatcher::new(&path, slot.clone(), Duration::from_secs(1));

        write_manifest(&path, "1.1.0");
        assert!(watcher.check());
        write_manifest(&path, "1.2.0");
        assert!(!watcher.check());

        let pending = rx.try_recv().unwrap();
        assert_eq!(pending.version(), "1.1.0");
        assert_eq!(slot.current().version, "1.0.0");
    }

    #[tokio::test]
    async fn test_detects_build_directory_created_after_start() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build");
        let path = build.join("manifest.json");
        let slot = VersionSlot::new(BuildManifest::new("1.0.0"));
        let (watcher, rx) = VersionWatcher::new(&path, slot, Duration::from_millis(50));

        let _guard = watcher.run();

        fs::create_dir(&build).unwrap();
        write_manifest(&path, "2.0.0");

        let pending = tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .expect("deploy was never detected")
            .unwrap();
        assert_eq!(pending.version(), "2.0.0");
    }

    #[tokio::test]
    async fn test_periodic_check_sees_later_deploy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        write_manifest(&path, "1.0.0");
        let slot = VersionSlot::new(BuildManifest::new("1.0.0"));
        let (watcher, mut rx) = VersionWatcher::new(&path, slot, Duration::from_millis(50));

        let _guard = watcher.run();
        assert!(rx.try_recv().is_err());

        write_manifest(&path, "1.1.0");
        let pending = tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .expect("deploy was never detected")
            .unwrap();
        assert_eq!(pending.version(), "1.1.0");
    }

    #[test]
    fn test_skip_waiting_activates() {
        let slot = VersionSlot::new(BuildManifest::new("1.0.0"));
        let pending = PendingVersion {
            manifest: BuildManifest::new("2.0.0"),
            slot: slot.clone(),
        };

        pending.post_message(&ControlMessage::SkipWaiting).unwrap();
        assert_eq!(slot.current().version, "2.0.0");

        let err = pending.post_message(&ControlMessage::SkipWaiting).unwrap_err();
        assert!(matches!(err, ActivationError::AlreadyActive(v) if v == "2.0.0"));
    }

    #[test]
    fn test_malformed_message_rejected() {
        let slot = VersionSlot::new(BuildManifest::new("1.0.0"));
        let pending = PendingVersion {
            manifest: BuildManifest::new("2.0.0"),
            slot: slot.clone(),
        };
        assert!(matches!(pending.handle("{}"), Err(ActivationError::Malformed(_))));
        assert_eq!(slot.current().version, "1.0.0");
    }
}
