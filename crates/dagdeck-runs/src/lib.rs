//! Launch requests dispatched from the console.

pub mod store;
pub mod types;

pub use store::{LaunchStore, StoreError};
pub use types::{LaunchLog, LaunchRequest, LaunchStatus};
