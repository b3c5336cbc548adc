//! Background snapshot reloading.

use camino::{Utf8Path, Utf8PathBuf};
use dagdeck_core::{load_snapshot, AssetGraph, SnapshotError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};

/// Configuration for the polling service.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    pub snapshot_path: Utf8PathBuf,
    /// Time between scheduled reloads.
    pub interval: Duration,
    /// Job name that replaces the snapshot's own.
    pub job_name: Option<String>,
}

/// Result of one reload.
#[derive(Debug)]
pub enum SnapshotUpdate {
    Loaded(AssetGraph),
    Failed(String),
}

/// Newest reload result not yet picked up by the UI loop.
///
/// A newer result replaces an unread older one.
#[derive(Debug, Default)]
pub struct SnapshotFeed {
    pending: Option<SnapshotUpdate>,
}

impl SnapshotFeed {
    pub fn publish(&mut self, update: SnapshotUpdate) {
        self.pending = Some(update);
    }

    pub fn take(&mut self) -> Option<SnapshotUpdate> {
        self.pending.take()
    }
}

/// Load a snapshot and resolve it into a graph.
pub fn load_graph(path: &Utf8Path, job_name: Option<&str>) -> Result<AssetGraph, SnapshotError> {
    let mut graph = load_snapshot(path)?.resolve();
    if let Some(job_name) = job_name {
        graph.job_name = job_name.to_string();
    }
    Ok(graph)
}

/// Polling service that runs in the background.
pub struct PollingService {
    feed: Arc<Mutex<SnapshotFeed>>,
    config: PollingConfig,
    requests: mpsc::UnboundedReceiver<()>,
}

impl PollingService {
    /// Create a service. Every message on `requests` triggers an immediate
    /// reload; dropping the sender stops the service.
    pub fn new(
        feed: Arc<Mutex<SnapshotFeed>>,
        config: PollingConfig,
        requests: mpsc::UnboundedReceiver<()>,
    ) -> Self {
        Self {
            feed,
            config,
            requests,
        }
    }

    /// Start the polling service.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires at once; the caller has already loaded the
        // initial snapshot.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                request = self.requests.recv() => {
                    if request.is_none() {
                        tracing::debug!("Reload channel closed, stopping poller");
                        return;
                    }
                    // Coalesce requests queued while the last reload ran.
                    while self.requests.try_recv().is_ok() {}
                    ticker.reset();
                }
            }

            let update = self.reload().await;
            self.feed.lock().await.publish(update);
        }
    }

    async fn reload(&self) -> SnapshotUpdate {
        let path = self.config.snapshot_path.clone();
        let job_name = self.config.job_name.clone();

        match tokio::task::spawn_blocking(move || load_graph(&path, job_name.as_deref())).await {
            Ok(Ok(graph)) => {
                tracing::debug!(
                    "Reloaded {} ({} nodes)",
                    self.config.snapshot_path,
                    graph.nodes.len()
                );
                SnapshotUpdate::Loaded(graph)
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to reload {}: {}", self.config.snapshot_path, e);
                SnapshotUpdate::Failed(e.to_string())
            }
            Err(e) => {
                tracing::error!("Snapshot reload task failed: {}", e);
                SnapshotUpdate::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
        "job_name": "daily",
        "nodes": [
            {
                "id": "orders",
                "asset_key": {"path": ["orders"]},
                "op_name": "load_orders",
                "repository": {"name": "analytics", "location": {"name": "prod"}}
            }
        ]
    }"#;

    fn write_snapshot(dir: &TempDir, content: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join("snapshot.json")).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_graph_with_job_override() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(&dir, SNAPSHOT);

        let graph = load_graph(&path, None).unwrap();
        assert_eq!(graph.job_name, "daily");
        assert_eq!(graph.nodes.len(), 1);

        let graph = load_graph(&path, Some("nightly")).unwrap();
        assert_eq!(graph.job_name, "nightly");
    }

    #[test]
    fn test_feed_keeps_latest() {
        let mut feed = SnapshotFeed::default();
        feed.publish(SnapshotUpdate::Failed("first".into()));
        feed.publish(SnapshotUpdate::Failed("second".into()));

        match feed.take() {
            Some(SnapshotUpdate::Failed(msg)) => assert_eq!(msg, "second"),
            other => panic!("unexpected update: {:?}", other),
        }
        assert!(feed.take().is_none());
    }

    #[tokio::test]
    async fn test_reload_on_request() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(&dir, SNAPSHOT);

        let feed = Arc::new(Mutex::new(SnapshotFeed::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let config = PollingConfig {
            snapshot_path: path,
            interval: Duration::from_secs(3600),
            job_name: None,
        };
        let handle = PollingService::new(feed.clone(), config, rx).start();

        tx.send(()).unwrap();
        let mut update = None;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            update = feed.lock().await.take();
            if update.is_some() {
                break;
            }
        }
        match update {
            Some(SnapshotUpdate::Loaded(graph)) => assert_eq!(graph.nodes[0].id, "orders"),
            other => panic!("unexpected update: {:?}", other),
        }

        drop(tx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_reload_is_published() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(&dir, "{ not json");

        let feed = Arc::new(Mutex::new(SnapshotFeed::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let config = PollingConfig {
            snapshot_path: path,
            interval: Duration::from_secs(3600),
            job_name: None,
        };
        let _handle = PollingService::new(feed.clone(), config, rx).start();

        tx.send(()).unwrap();
        let mut update = None;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            update = feed.lock().await.take();
            if update.is_some() {
                break;
            }
        }
        assert!(matches!(update, Some(SnapshotUpdate::Failed(_))));
    }
}
