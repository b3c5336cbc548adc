//! TUI components.

pub mod asset_detail;
pub mod asset_graph;
pub mod asset_node;
pub mod context_menu;
pub mod footer;
pub mod header;
pub mod instance_pages;
pub mod tab_bar;

pub use asset_detail::AssetDetail;
pub use asset_graph::{AssetGraphView, NodeCache};
pub use asset_node::{AssetNodeProps, AssetNodeView, NodeRenderKey, SummaryRow};
pub use context_menu::{menu_items, ContextMenuState, MenuAction, MenuItem, MenuOutcome};
pub use footer::Footer;
pub use header::Header;
pub use instance_pages::InstancePages;
pub use tab_bar::{TabBar, TabBarProps, TabLink, DEFAULT_HEALTH_TITLE};
