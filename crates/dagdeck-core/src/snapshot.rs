//! Snapshot file loading.
//!
//! A snapshot is the JSON result of the node and live-data queries plus the
//! instance section, written by the fetch layer and reloaded by the poller.

use crate::graph::AssetGraph;
use crate::live::{build_live_data, LiveRecord};
use crate::model::{deserialize_nullable_string, NodeDefinition, DEFAULT_JOB_NAME};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Snapshot file not found: {0}")]
    NotFound(Utf8PathBuf),
    #[error("Duplicate node id in snapshot: {0}")]
    DuplicateNode(String),
}

/// Permissions granted to the viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub can_see_config: bool,
}

/// A named schedule, sensor or backfill listed on an instance tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceItem {
    pub name: String,

    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub status: String,

    #[serde(default)]
    pub detail: Option<String>,
}

/// Instance-level data shown under the instance tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceInfo {
    pub permissions: Permissions,
    pub schedules: Vec<InstanceItem>,
    pub sensors: Vec<InstanceItem>,
    pub backfills: Vec<InstanceItem>,
    /// Instance configuration, only shown when permitted
    pub config_yaml: Option<String>,
}

/// Raw snapshot as written by the fetch layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSnapshot {
    pub job_name: Option<String>,
    pub nodes: Vec<NodeDefinition>,
    /// Live records keyed by node id
    pub live_data: HashMap<String, LiveRecord>,
    pub instance: InstanceInfo,
}

impl GraphSnapshot {
    /// Resolve live status and produce the graph the views consume.
    pub fn resolve(self) -> AssetGraph {
        let live = build_live_data(&self.nodes, &self.live_data);
        AssetGraph {
            job_name: self
                .job_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_JOB_NAME.to_string()),
            nodes: self.nodes,
            live,
            instance: self.instance,
            loaded_at: Utc::now(),
        }
    }
}

/// Parse snapshot JSON and reject duplicate node ids.
pub fn parse_snapshot(content: &str) -> Result<GraphSnapshot, SnapshotError> {
    let snapshot: GraphSnapshot = serde_json::from_str(content)?;

    let mut seen = HashSet::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(SnapshotError::DuplicateNode(node.id.clone()));
        }
    }

    Ok(snapshot)
}

/// Load and parse a snapshot file.
pub fn load_snapshot(path: &Utf8Path) -> Result<GraphSnapshot, SnapshotError> {
    if !path.exists() {
        return Err(SnapshotError::NotFound(path.to_owned()));
    }
    let content = std::fs::read_to_string(path)?;
    let snapshot = parse_snapshot(&content)?;
    tracing::debug!(
        "Loaded snapshot {} with {} nodes and {} live records",
        path,
        snapshot.nodes.len(),
        snapshot.live_data.len()
    );
    Ok(snapshot)
}
