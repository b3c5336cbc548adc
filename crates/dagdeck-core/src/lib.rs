//! Asset graph data model for dagdeck.
//!
//! This crate owns the shapes the views consume: node definitions, live
//! materialization status, and the snapshot file the poller reloads.

pub mod graph;
pub mod live;
pub mod model;
pub mod snapshot;

pub use graph::AssetGraph;
pub use live::{build_live_data, LiveRecord};
pub use model::{
    AssetKey, ComputeStatus, LiveStatus, MaterializationEvent, MetadataEntry, MetadataTag,
    NodeDefinition, RepoAddress, Repository, RepositoryLocation, RunRef, StepStats,
    DEFAULT_JOB_NAME, KIND_TAG_KEY,
};
pub use snapshot::{
    load_snapshot, parse_snapshot, GraphSnapshot, InstanceInfo, InstanceItem, Permissions,
    SnapshotError,
};
