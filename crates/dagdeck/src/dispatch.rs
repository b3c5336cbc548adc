//! Launch dispatcher backed by the launch log.

use dagdeck_core::RepoAddress;
use dagdeck_monitor::LaunchDispatcher;
use dagdeck_runs::{LaunchRequest, LaunchStore};

/// Appends launch requests to the JSON log an orchestrator consumes.
pub struct StoreDispatcher {
    store: LaunchStore,
}

impl StoreDispatcher {
    pub fn new(store: LaunchStore) -> Self {
        Self { store }
    }
}

impl LaunchDispatcher for StoreDispatcher {
    fn launch(&mut self, repository: &RepoAddress, job_name: &str, op_name: Option<&str>) {
        let Some(op_name) = op_name else {
            tracing::warn!("Launch of {} skipped: asset has no op", job_name);
            return;
        };

        let request = LaunchRequest::new(
            repository.clone(),
            job_name.to_string(),
            op_name.to_string(),
        );
        match self.store.append(request) {
            Ok(log) => tracing::info!(
                "Launch requested: {} in {} ({} pending)",
                op_name,
                repository,
                log.pending().count()
            ),
            Err(e) => tracing::error!(
                "Failed to write launch of {} to {}: {}",
                op_name,
                self.store.path(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn repo() -> RepoAddress {
        RepoAddress {
            name: "analytics".into(),
            location: "prod".into(),
        }
    }

    #[test]
    fn test_launch_appends_request() {
        let dir = TempDir::new().unwrap();
        let base = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let mut dispatcher = StoreDispatcher::new(LaunchStore::new(&base));

        dispatcher.launch(&repo(), "daily", Some("load_orders"));

        let log = LaunchStore::new(&base).load().unwrap();
        let latest = log.latest().unwrap();
        assert_eq!(latest.op_name, "load_orders");
        assert_eq!(latest.job_name, "daily");
        assert_eq!(latest.repository, repo());
    }

    #[test]
    fn test_launch_without_op_is_skipped() {
        let dir = TempDir::new().unwrap();
        let base = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let mut dispatcher = StoreDispatcher::new(LaunchStore::new(&base));

        dispatcher.launch(&repo(), "daily", None);

        assert!(!base.join(".dagdeck").join("launches.json").exists());
    }

    #[test]
    fn test_write_failure_does_not_panic() {
        let dir = TempDir::new().unwrap();
        let blocker = Utf8PathBuf::try_from(dir.path().join("file")).unwrap();
        std::fs::write(&blocker, "").unwrap();
        // The parent of the log is a regular file, so the write fails.
        let mut dispatcher = StoreDispatcher::new(LaunchStore::at(blocker.join("launches.json")));

        dispatcher.launch(&repo(), "daily", Some("load_orders"));
    }
}
