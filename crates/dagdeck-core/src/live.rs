//! Build per-node live status from raw records.
//!
//! The fetch layer reports run ids and the latest materialization per node.
//! Staleness against upstream assets is derived here when the record does
//! not already carry it.

use crate::model::{
    AssetKey, ComputeStatus, LiveStatus, MaterializationEvent, NodeDefinition, RunRef,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Live record as it arrives in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveRecord {
    pub last_materialization: Option<MaterializationEvent>,
    pub in_progress_run_ids: Vec<String>,
    pub unstarted_run_ids: Vec<String>,
    pub run_which_failed_to_materialize: Option<RunRef>,
    pub runs_since_materialization: usize,
    /// Precomputed staleness; derived from upstream timestamps when absent
    pub compute_status: Option<ComputeStatus>,
}

/// Resolve live status for every node that has a record, keyed by node id.
///
/// Upstream keys that are not part of the graph are ignored when deciding
/// staleness.
pub fn build_live_data(
    nodes: &[NodeDefinition],
    records: &HashMap<String, LiveRecord>,
) -> HashMap<String, LiveStatus> {
    let materialized_at: HashMap<&AssetKey, Option<f64>> = nodes
        .iter()
        .map(|node| {
            let at = records
                .get(&node.id)
                .and_then(|r| r.last_materialization.as_ref())
                .and_then(MaterializationEvent::materialized_at);
            (&node.asset_key, at)
        })
        .collect();

    let mut live = HashMap::with_capacity(records.len());
    for node in nodes {
        let Some(record) = records.get(&node.id) else {
            continue;
        };

        let compute_status = record.compute_status.unwrap_or_else(|| {
            compute_staleness(node, record, &materialized_at)
        });

        live.insert(
            node.id.clone(),
            LiveStatus {
                last_materialization: record.last_materialization.clone(),
                in_progress_run_ids: record.in_progress_run_ids.clone(),
                unstarted_run_ids: record.unstarted_run_ids.clone(),
                run_which_failed_to_materialize: record.run_which_failed_to_materialize.clone(),
                runs_since_materialization: record.runs_since_materialization,
                compute_status,
            },
        );
    }

    let orphans = records.keys().filter(|id| !live.contains_key(*id)).count();
    if orphans > 0 {
        tracing::warn!("Ignoring {} live records with no matching node", orphans);
    }

    live
}

fn compute_staleness(
    node: &NodeDefinition,
    record: &LiveRecord,
    materialized_at: &HashMap<&AssetKey, Option<f64>>,
) -> ComputeStatus {
    let Some(own) = record
        .last_materialization
        .as_ref()
        .and_then(MaterializationEvent::materialized_at)
    else {
        return ComputeStatus::None;
    };

    let upstream_newer = node
        .depends_on
        .iter()
        .filter_map(|key| materialized_at.get(key).copied().flatten())
        .any(|upstream| upstream > own);

    if upstream_newer {
        ComputeStatus::Old
    } else {
        ComputeStatus::Good
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Repository, StepStats};

    fn node(id: &str, deps: &[&str]) -> NodeDefinition {
        NodeDefinition {
            id: id.to_string(),
            asset_key: AssetKey::new([id]),
            op_name: None,
            description: None,
            metadata_entries: vec![],
            partition_definition: None,
            repository: Repository::default(),
            depends_on: deps.iter().map(|d| AssetKey::new([*d])).collect(),
        }
    }

    fn materialized(at: f64) -> LiveRecord {
        LiveRecord {
            last_materialization: Some(MaterializationEvent {
                run_id: "run".into(),
                timestamp: Some(at),
                step_stats: StepStats::default(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_staleness_from_upstream() {
        let nodes = vec![node("raw", &[]), node("clean", &["raw"]), node("report", &["clean"])];
        let records = HashMap::from([
            ("raw".to_string(), materialized(300.0)),
            ("clean".to_string(), materialized(200.0)),
            ("report".to_string(), materialized(250.0)),
        ]);

        let live = build_live_data(&nodes, &records);
        assert_eq!(live["raw"].compute_status, ComputeStatus::Good);
        assert_eq!(live["clean"].compute_status, ComputeStatus::Old);
        // Only direct upstreams count
        assert_eq!(live["report"].compute_status, ComputeStatus::Good);
    }

    #[test]
    fn test_never_materialized_is_none() {
        let nodes = vec![node("raw", &[]), node("clean", &["raw"])];
        let records = HashMap::from([
            ("raw".to_string(), materialized(300.0)),
            ("clean".to_string(), LiveRecord::default()),
        ]);

        let live = build_live_data(&nodes, &records);
        assert_eq!(live["clean"].compute_status, ComputeStatus::None);
    }

    #[test]
    fn test_explicit_status_wins() {
        let nodes = vec![node("raw", &[])];
        let mut record = materialized(100.0);
        record.compute_status = Some(ComputeStatus::Old);
        let records = HashMap::from([("raw".to_string(), record)]);

        let live = build_live_data(&nodes, &records);
        assert_eq!(live["raw"].compute_status, ComputeStatus::Old);
    }

    #[test]
    fn test_unknown_upstream_and_missing_records() {
        let nodes = vec![node("clean", &["external"]), node("other", &[])];
        let records = HashMap::from([
            ("clean".to_string(), materialized(100.0)),
            ("ghost".to_string(), materialized(50.0)),
        ]);

        let live = build_live_data(&nodes, &records);
        assert_eq!(live.len(), 1);
        assert_eq!(live["clean"].compute_status, ComputeStatus::Good);
        assert!(!live.contains_key("other"));
    }

    #[test]
    fn test_step_end_time_used_without_timestamp() {
        let nodes = vec![node("raw", &[]), node("clean", &["raw"])];
        let mut raw = LiveRecord::default();
        raw.last_materialization = Some(MaterializationEvent {
            run_id: "r".into(),
            timestamp: None,
            step_stats: StepStats {
                step_key: "raw".into(),
                start_time: Some(10.0),
                end_time: Some(500.0),
            },
        });
        let records = HashMap::from([
            ("raw".to_string(), raw),
            ("clean".to_string(), materialized(400.0)),
        ]);

        let live = build_live_data(&nodes, &records);
        assert_eq!(live["clean"].compute_status, ComputeStatus::Old);
    }
}
