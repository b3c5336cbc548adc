//! Node definitions and live status types.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Job name used when launching assets that are not part of a named job.
pub const DEFAULT_JOB_NAME: &str = "__ASSET_GROUP";

/// Metadata key whose value is shown as a badge on the node.
pub const KIND_TAG_KEY: &str = "kind";

/// Deserialize a string field that may be null, defaulting to empty string.
pub(crate) fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

fn hash_opt_f64<H: Hasher>(value: Option<f64>, state: &mut H) {
    value.map(f64::to_bits).hash(state);
}

/// Ordered path of strings that uniquely identifies an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetKey {
    pub path: Vec<String>,
}

impl AssetKey {
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable name, e.g. "warehouse > orders".
    pub fn display_name(&self) -> String {
        self.path.join(" > ")
    }

    /// Path segment form used in catalog URLs, e.g. "warehouse/orders".
    pub fn url_path(&self) -> String {
        self.path.join("/")
    }

    /// Parse the catalog URL form back into a key. Empty segments are dropped.
    pub fn from_url_path(s: &str) -> Self {
        Self::new(s.split('/').filter(|segment| !segment.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryLocation {
    pub name: String,
}

/// Repository that owns an asset definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub location: RepositoryLocation,
}

impl Repository {
    pub fn address(&self) -> RepoAddress {
        RepoAddress {
            name: self.name.clone(),
            location: self.location.name.clone(),
        }
    }
}

/// Flattened repository identity used when dispatching launches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoAddress {
    pub name: String,
    pub location: String,
}

impl fmt::Display for RepoAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.location)
    }
}

/// Declared metadata entry on an asset definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub label: String,

    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub text: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Key/value pair handed to the node view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataTag {
    pub key: String,
    pub value: String,
}

impl MetadataTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Static definition of an asset node. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique node identifier
    pub id: String,

    /// Asset key path
    pub asset_key: AssetKey,

    /// Op that computes this asset
    #[serde(default)]
    pub op_name: Option<String>,

    /// Markdown description
    #[serde(default)]
    pub description: Option<String>,

    /// Declared metadata entries
    #[serde(default)]
    pub metadata_entries: Vec<MetadataEntry>,

    /// Partition scheme, if partitioned
    #[serde(default)]
    pub partition_definition: Option<String>,

    /// Owning repository and location
    pub repository: Repository,

    /// Upstream asset keys
    #[serde(default)]
    pub depends_on: Vec<AssetKey>,
}

impl NodeDefinition {
    pub fn display_name(&self) -> String {
        self.asset_key.display_name()
    }

    /// Op name, when it says something the display name doesn't.
    pub fn secondary_label(&self) -> Option<&str> {
        let op_name = self.op_name.as_deref().filter(|op| !op.is_empty())?;
        if op_name == self.display_name() {
            None
        } else {
            Some(op_name)
        }
    }

    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Metadata entries as view tags.
    pub fn metadata_tags(&self) -> Vec<MetadataTag> {
        self.metadata_entries
            .iter()
            .map(|entry| MetadataTag::new(entry.label.clone(), entry.text.clone()))
            .collect()
    }
}

/// Step timing of a materialization, in unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub step_key: String,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
}

impl Hash for StepStats {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.step_key.hash(state);
        hash_opt_f64(self.start_time, state);
        hash_opt_f64(self.end_time, state);
    }
}

/// Most recent materialization of an asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterializationEvent {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub run_id: String,

    /// When the materialization was recorded (unix seconds)
    pub timestamp: Option<f64>,

    #[serde(default)]
    pub step_stats: StepStats,
}

impl MaterializationEvent {
    /// Best known materialization time: the event timestamp, else the step end.
    pub fn materialized_at(&self) -> Option<f64> {
        self.timestamp.or(self.step_stats.end_time)
    }
}

impl Hash for MaterializationEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.run_id.hash(state);
        hash_opt_f64(self.timestamp, state);
        self.step_stats.hash(state);
    }
}

/// Reference to a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunRef {
    pub run_id: String,

    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub status: String,
}

/// Freshness of an asset relative to its upstream dependencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeStatus {
    /// An upstream asset was materialized after this one
    Old,
    /// Up to date with upstream
    Good,
    /// Never materialized
    #[default]
    None,
}

/// Live status of a node, refreshed by the poller.
#[derive(Debug, Clone, Default, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveStatus {
    pub last_materialization: Option<MaterializationEvent>,
    pub in_progress_run_ids: Vec<String>,
    pub unstarted_run_ids: Vec<String>,
    pub run_which_failed_to_materialize: Option<RunRef>,
    pub runs_since_materialization: usize,
    pub compute_status: ComputeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn definition(path: &[&str], op_name: Option<&str>) -> NodeDefinition {
        NodeDefinition {
            id: path.join("."),
            asset_key: AssetKey::new(path.iter().copied()),
            op_name: op_name.map(String::from),
            description: None,
            metadata_entries: vec![],
            partition_definition: None,
            repository: Repository::default(),
            depends_on: vec![],
        }
    }

    #[test]
    fn test_asset_key_names() {
        let key = AssetKey::new(["warehouse", "orders"]);
        assert_eq!(key.display_name(), "warehouse > orders");
        assert_eq!(key.url_path(), "warehouse/orders");
        assert_eq!(AssetKey::from_url_path("warehouse//orders/"), key);
    }

    #[test]
    fn test_secondary_label() {
        assert_eq!(definition(&["orders"], Some("orders")).secondary_label(), None);
        assert_eq!(definition(&["orders"], None).secondary_label(), None);
        assert_eq!(definition(&["orders"], Some("")).secondary_label(), None);
        assert_eq!(
            definition(&["raw", "orders"], Some("load_orders")).secondary_label(),
            Some("load_orders")
        );
    }

    #[test]
    fn test_repo_address_display() {
        let repo = Repository {
            name: "analytics".into(),
            location: RepositoryLocation {
                name: "prod".into(),
            },
        };
        assert_eq!(repo.address().to_string(), "analytics@prod");
    }

    #[test]
    fn test_parse_live_status_with_nulls() {
        let json = r#"{
            "last_materialization": {
                "run_id": null,
                "timestamp": 1700000100.0,
                "step_stats": {"step_key": null, "start_time": 1700000000.0, "end_time": null}
            },
            "in_progress_run_ids": ["r1"],
            "unstarted_run_ids": [],
            "run_which_failed_to_materialize": null,
            "runs_since_materialization": 0,
            "compute_status": "old"
        }"#;

        let live: LiveStatus = serde_json::from_str(json).unwrap();
        let event = live.last_materialization.unwrap();
        assert_eq!(event.run_id, "");
        assert_eq!(event.step_stats.end_time, None);
        assert_eq!(event.materialized_at(), Some(1700000100.0));
        assert_eq!(live.compute_status, ComputeStatus::Old);
    }

    #[test]
    fn test_step_stats_hash_tracks_times() {
        let hash = |stats: &StepStats| {
            let mut hasher = DefaultHasher::new();
            stats.hash(&mut hasher);
            hasher.finish()
        };
        let a = StepStats {
            step_key: "orders".into(),
            start_time: Some(1.0),
            end_time: Some(2.0),
        };
        let mut b = a.clone();
        assert_eq!(hash(&a), hash(&b));
        b.end_time = Some(3.0);
        assert_ne!(hash(&a), hash(&b));
    }
}
