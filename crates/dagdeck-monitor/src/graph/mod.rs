//! Graph geometry and status derivation shared by the graph and catalog views.

pub mod layout;
pub mod status;

pub use layout::{Connector, GraphLayout, Move, NodeDimensions, Placement, ScrollOffset};
pub use status::{derive_status, status_counts, NodeStatus, RunIndicator, StatusCounts};
