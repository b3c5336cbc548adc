//! File watcher for the snapshot file.

use camino::{Utf8Path, Utf8PathBuf};
use miette::{miette, IntoDiagnostic, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Duration;

/// Events from the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherEvent {
    /// The snapshot file was written or replaced
    SnapshotChanged,
    /// Watcher error
    Error(String),
}

/// Watches the directory holding the snapshot, so that files replaced by
/// rename are still seen.
pub struct SnapshotWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<WatcherEvent>,
}

impl SnapshotWatcher {
    pub fn new(snapshot_path: &Utf8Path) -> Result<Self> {
        let file_name = snapshot_path
            .file_name()
            .ok_or_else(|| miette!("Snapshot path has no file name: {}", snapshot_path))?
            .to_string();
        let dir = match snapshot_path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_owned(),
            _ => Utf8PathBuf::from("."),
        };

        let (tx, rx) = channel();
        let watcher = create_watcher(tx, &dir, file_name)?;
        tracing::info!("Watching {} for snapshot changes", dir);

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Try to receive an event without blocking.
    pub fn try_recv_nonblocking(&self) -> Option<WatcherEvent> {
        self.receiver.try_recv().ok()
    }
}

fn create_watcher(
    tx: Sender<WatcherEvent>,
    dir: &Utf8Path,
    file_name: String,
) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if is_snapshot_event(&event, &file_name) {
                    let _ = tx.send(WatcherEvent::SnapshotChanged);
                }
            }
            Err(e) => {
                let _ = tx.send(WatcherEvent::Error(e.to_string()));
            }
        },
        Config::default().with_poll_interval(Duration::from_millis(500)),
    )
    .into_diagnostic()?;

    watcher
        .watch(dir.as_std_path(), RecursiveMode::NonRecursive)
        .into_diagnostic()?;

    Ok(watcher)
}

/// Whether the event creates or modifies the snapshot file.
fn is_snapshot_event(event: &Event, file_name: &str) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name().and_then(|n| n.to_str()) == Some(file_name))
}
