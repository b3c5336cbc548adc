use chrono::{DateTime, Utc};
use dagdeck_core::RepoAddress;
use serde::{Deserialize, Serialize};

/// Status of a launch request as seen by the console.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LaunchStatus {
    /// Written to the log, not yet picked up
    #[default]
    Requested,
    /// Picked up by the orchestrator
    Submitted,
    /// Rejected by the orchestrator
    Rejected,
}

/// A request to materialize one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Request identifier, unique within a log.
    pub id: String,

    /// Repository that owns the op.
    pub repository: RepoAddress,

    /// Job to launch.
    pub job_name: String,

    /// Op selection for the launch.
    pub op_name: String,

    /// When the request was made.
    pub requested_at: DateTime<Utc>,

    pub status: LaunchStatus,
}

impl LaunchRequest {
    /// Create a new request stamped with the current time.
    pub fn new(repository: RepoAddress, job_name: String, op_name: String) -> Self {
        let requested_at = Utc::now();
        Self {
            id: format!("{}-{}", op_name, requested_at.timestamp_millis()),
            repository,
            job_name,
            op_name,
            requested_at,
            status: LaunchStatus::Requested,
        }
    }
}

/// Collection of launch requests, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchLog {
    pub requests: Vec<LaunchRequest>,
}

impl LaunchLog {
    /// Maximum number of requests to keep.
    pub const MAX_REQUESTS: usize = 50;

    /// Record a request, replacing any request with the same id.
    pub fn push(&mut self, request: LaunchRequest) {
        self.requests.retain(|r| r.id != request.id);
        self.requests.push(request);
        // Sort by requested_at descending
        self.requests
            .sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        self.requests.truncate(Self::MAX_REQUESTS);
    }

    /// Most recent request, if any.
    pub fn latest(&self) -> Option<&LaunchRequest> {
        self.requests.first()
    }

    /// Requests still waiting to be picked up.
    pub fn pending(&self) -> impl Iterator<Item = &LaunchRequest> {
        self.requests
            .iter()
            .filter(|r| r.status == LaunchStatus::Requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn repo() -> RepoAddress {
        RepoAddress {
            name: "analytics".into(),
            location: "prod".into(),
        }
    }

    #[test]
    fn test_launch_request_new() {
        let request = LaunchRequest::new(repo(), "daily".into(), "load_orders".into());
        assert_eq!(request.status, LaunchStatus::Requested);
        assert!(request.id.starts_with("load_orders-"));
    }

    #[test]
    fn test_log_orders_newest_first() {
        let mut log = LaunchLog::default();
        let mut old = LaunchRequest::new(repo(), "daily".into(), "a".into());
        old.requested_at -= Duration::minutes(5);
        old.id = "old".into();
        log.push(old);
        log.push(LaunchRequest::new(repo(), "daily".into(), "b".into()));

        assert_eq!(log.latest().unwrap().op_name, "b");
        assert_eq!(log.pending().count(), 2);
    }

    #[test]
    fn test_log_truncates() {
        let mut log = LaunchLog::default();
        for i in 0..60 {
            let mut request = LaunchRequest::new(repo(), "daily".into(), "op".into());
            request.id = format!("req-{i}");
            log.push(request);
        }
        assert_eq!(log.requests.len(), LaunchLog::MAX_REQUESTS);
    }

    #[test]
    fn test_push_replaces_same_id() {
        let mut log = LaunchLog::default();
        let mut request = LaunchRequest::new(repo(), "daily".into(), "op".into());
        log.push(request.clone());
        request.status = LaunchStatus::Submitted;
        log.push(request);

        assert_eq!(log.requests.len(), 1);
        assert_eq!(log.pending().count(), 0);
    }
}
