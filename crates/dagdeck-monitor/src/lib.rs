//! Terminal views for the dagdeck console.
//!
//! The asset graph, the asset catalog page and the instance section are
//! rendered from an [`dagdeck_core::AssetGraph`] handed in by the caller.
//! Launches and kind-info requests leave through the seams in [`signals`].

pub mod app;
pub mod components;
pub mod graph;
pub mod memo;
pub mod refresh;
pub mod routes;
pub mod signals;
pub mod ui;

pub use app::{App, AppConfig, HealthInfo};
pub use refresh::RefreshState;
pub use routes::{InstanceTab, Route};
pub use signals::{KindInfoSignal, LaunchDispatcher, NoopDispatcher};
pub use ui::Theme;
