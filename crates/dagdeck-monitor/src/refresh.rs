//! Countdown to the next data refresh.

use dagdeck_parsers::format_countdown;
use std::time::{Duration, Instant};

/// Tracks when live data was last reloaded and when the next reload is due.
#[derive(Debug, Clone, Copy)]
pub struct RefreshState {
    interval: Duration,
    last_refresh: Instant,
    in_flight: bool,
}

impl RefreshState {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_refresh: Instant::now(),
            in_flight: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_refresh(&self) -> Instant {
        self.last_refresh
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Record a completed reload.
    pub fn mark_refreshed(&mut self, at: Instant) {
        self.last_refresh = at;
        self.in_flight = false;
    }

    /// Record that a reload has been requested but not finished.
    pub fn mark_in_flight(&mut self) {
        self.in_flight = true;
    }

    /// Whole seconds until the next reload, rounded up. Zero once overdue.
    pub fn seconds_remaining(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.last_refresh);
        let remaining = self.interval.saturating_sub(elapsed);
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        !self.in_flight && self.seconds_remaining(now) == 0
    }

    /// Indicator text, e.g. "Refreshing in 0:15".
    pub fn label(&self, now: Instant) -> String {
        if self.in_flight {
            "Refreshing…".to_string()
        } else {
            format!("Refreshing in {}", format_countdown(self.seconds_remaining(now)))
        }
    }
}
