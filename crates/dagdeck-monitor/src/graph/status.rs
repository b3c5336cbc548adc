//! Run indicator selection.

use dagdeck_core::{AssetGraph, ComputeStatus, LiveStatus};

/// Braille spinner frames for an active run.
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// The single run indicator shown on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunIndicator {
    /// A run is materializing the asset now
    Running,
    /// A queued run will materialize the asset
    Scheduled,
    /// Recent runs did not materialize the asset
    Attention,
}

impl RunIndicator {
    pub fn tooltip(self) -> &'static str {
        match self {
            Self::Running => "A run is currently rematerializing this asset.",
            Self::Scheduled => "A run has started that will rematerialize this asset soon.",
            Self::Attention => "This asset was not materialized by one or more recent runs.",
        }
    }

    /// Glyph for the given animation tick. Only the running spinner moves.
    pub fn glyph(self, tick: usize) -> &'static str {
        match self {
            Self::Running => SPINNER_FRAMES[tick % SPINNER_FRAMES.len()],
            Self::Scheduled => "◌",
            Self::Attention => "⚠",
        }
    }

    pub fn is_animated(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Status annotations of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NodeStatus {
    pub indicator: Option<RunIndicator>,
    /// An upstream asset changed since the last materialization
    pub upstream_changed: bool,
}

/// Pick the run indicator by priority: running, then scheduled, then
/// attention. The upstream-changed flag is reported alongside.
pub fn derive_status(live: Option<&LiveStatus>) -> NodeStatus {
    let Some(live) = live else {
        return NodeStatus::default();
    };

    let indicator = if !live.in_progress_run_ids.is_empty() {
        Some(RunIndicator::Running)
    } else if !live.unstarted_run_ids.is_empty() {
        Some(RunIndicator::Scheduled)
    } else if live.run_which_failed_to_materialize.is_some()
        || live.runs_since_materialization > 0
    {
        Some(RunIndicator::Attention)
    } else {
        None
    };

    NodeStatus {
        indicator,
        upstream_changed: live.compute_status == ComputeStatus::Old,
    }
}

/// Asset counts by status, shown on the overview tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub running: usize,
    pub scheduled: usize,
    pub attention: usize,
    pub upstream_changed: usize,
    pub never_materialized: usize,
}

pub fn status_counts(graph: &AssetGraph) -> StatusCounts {
    let mut counts = StatusCounts {
        total: graph.nodes.len(),
        ..Default::default()
    };

    for node in &graph.nodes {
        let live = graph.live_for(&node.id);
        let status = derive_status(live);
        match status.indicator {
            Some(RunIndicator::Running) => counts.running += 1,
            Some(RunIndicator::Scheduled) => counts.scheduled += 1,
            Some(RunIndicator::Attention) => counts.attention += 1,
            None => {}
        }
        if status.upstream_changed {
            counts.upstream_changed += 1;
        }
        if live.and_then(|l| l.last_materialization.as_ref()).is_none() {
            counts.never_materialized += 1;
        }
    }

    counts
}
