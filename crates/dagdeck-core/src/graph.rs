//! Resolved asset graph.

use crate::model::{AssetKey, LiveStatus, NodeDefinition};
use crate::snapshot::InstanceInfo;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Node definitions joined with their live status.
#[derive(Debug, Clone)]
pub struct AssetGraph {
    /// Job used when launching materializations
    pub job_name: String,

    /// Node definitions in snapshot order
    pub nodes: Vec<NodeDefinition>,

    /// Live status keyed by node id
    pub live: HashMap<String, LiveStatus>,

    /// Instance section data
    pub instance: InstanceInfo,

    /// When this graph was resolved
    pub loaded_at: DateTime<Utc>,
}

impl AssetGraph {
    pub fn empty(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
            nodes: Vec::new(),
            live: HashMap::new(),
            instance: InstanceInfo::default(),
            loaded_at: Utc::now(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_by_key(&self, key: &AssetKey) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| &n.asset_key == key)
    }

    pub fn live_for(&self, id: &str) -> Option<&LiveStatus> {
        self.live.get(id)
    }

    /// Ids of nodes that list `key` as an upstream dependency.
    pub fn downstream_of(&self, key: &AssetKey) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.depends_on.contains(key))
            .map(|n| n.id.as_str())
            .collect()
    }
}
