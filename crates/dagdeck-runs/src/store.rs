use crate::types::{LaunchLog, LaunchRequest};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent storage for launch requests.
pub struct LaunchStore {
    path: Utf8PathBuf,
}

impl LaunchStore {
    /// Create a store next to the given snapshot directory.
    ///
    /// Requests are stored at `.dagdeck/launches.json` within that directory.
    pub fn new(base_dir: &Utf8Path) -> Self {
        let path = base_dir.join(".dagdeck").join("launches.json");
        Self { path }
    }

    /// Create a store at an explicit file path.
    pub fn at(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Load the launch log from disk.
    ///
    /// Returns an empty log if the file doesn't exist.
    pub fn load(&self) -> Result<LaunchLog, StoreError> {
        if !self.path.exists() {
            return Ok(LaunchLog::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the launch log to disk.
    ///
    /// Creates parent directories if needed.
    pub fn save(&self, log: &LaunchLog) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(log)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Load, append one request, and save.
    pub fn append(&self, request: LaunchRequest) -> Result<LaunchLog, StoreError> {
        let mut log = self.load()?;
        log.push(request);
        self.save(&log)?;
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagdeck_core::RepoAddress;
    use tempfile::TempDir;

    fn request(op: &str) -> LaunchRequest {
        LaunchRequest::new(
            RepoAddress {
                name: "analytics".into(),
                location: "prod".into(),
            },
            "daily".into(),
            op.into(),
        )
    }

    #[test]
    fn test_store_load_nonexistent() {
        let temp = TempDir::new().unwrap();
        let store = LaunchStore::new(Utf8Path::from_path(temp.path()).unwrap());
        let log = store.load().unwrap();
        assert!(log.requests.is_empty());
    }

    #[test]
    fn test_store_append_and_load() {
        let temp = TempDir::new().unwrap();
        let base = Utf8Path::from_path(temp.path()).unwrap();
        let store = LaunchStore::new(base);

        store.append(request("load_orders")).unwrap();
        assert!(store.path().exists());
        assert!(store.path().starts_with(base.join(".dagdeck")));

        let loaded = store.load().unwrap();
        assert_eq!(loaded.requests.len(), 1);
        assert_eq!(loaded.requests[0].op_name, "load_orders");
        assert_eq!(loaded.requests[0].repository.to_string(), "analytics@prod");
    }

    #[test]
    fn test_store_rejects_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap().join("launches.json");
        fs::write(&path, "[").unwrap();

        let store = LaunchStore::at(path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
    }
}
