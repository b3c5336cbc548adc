//! Outbound seams of the views.
//!
//! Launches go to a [`LaunchDispatcher`] injected by the caller. Kind-badge
//! activation is announced to observers registered on a [`KindInfoSignal`].

use dagdeck_core::RepoAddress;

/// Receives materialization requests from the node context menu.
///
/// Dispatch is fire-and-forget. Implementations handle and log their own
/// failures; nothing is reported back to the view.
pub trait LaunchDispatcher {
    fn launch(&mut self, repository: &RepoAddress, job_name: &str, op_name: Option<&str>);
}

/// Dispatcher that drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDispatcher;

impl LaunchDispatcher for NoopDispatcher {
    fn launch(&mut self, repository: &RepoAddress, job_name: &str, op_name: Option<&str>) {
        tracing::debug!(
            "Dropping launch of {:?} in {} ({})",
            op_name,
            job_name,
            repository
        );
    }
}

type KindInfoObserver = Box<dyn FnMut(&str)>;

/// Observers of "show kind info" requests.
#[derive(Default)]
pub struct KindInfoSignal {
    observers: Vec<KindInfoObserver>,
}

impl KindInfoSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&str) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Notify every observer. Returns how many were notified.
    pub fn emit(&mut self, kind: &str) -> usize {
        for observer in &mut self.observers {
            observer(kind);
        }
        self.observers.len()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for KindInfoSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindInfoSignal")
            .field("observers", &self.observers.len())
            .finish()
    }
}
