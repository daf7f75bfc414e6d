use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::models::StatsSnapshot;

/// Approximate, in-memory activity counters.
///
/// Only timestamps are kept, never keys or targets. Nothing survives a
/// restart.
pub struct AnalyticsTracker {
    window: Duration,
    creations: Mutex<Vec<DateTime<Utc>>>,
    redirects: Mutex<Vec<DateTime<Utc>>>,
}

impl AnalyticsTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            creations: Mutex::new(Vec::new()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    pub fn record_creation(&self) {
        self.record_creation_at(Utc::now());
    }

    pub fn record_redirect(&self) {
        self.record_redirect_at(Utc::now());
    }

    pub fn record_creation_at(&self, at: DateTime<Utc>) {
        push(&self.creations, at);
    }

    pub fn record_redirect_at(&self, at: DateTime<Utc>) {
        push(&self.redirects, at);
    }

    /// Counts events inside the window, forgetting older ones for good
    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> StatsSnapshot {
        StatsSnapshot {
            creations_last_24h: prune(&self.creations, now, self.window),
            redirects_last_24h: prune(&self.redirects, now, self.window),
        }
    }
}

fn push(events: &Mutex<Vec<DateTime<Utc>>>, at: DateTime<Utc>) {
    events
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(at);
}

fn prune(events: &Mutex<Vec<DateTime<Utc>>>, now: DateTime<Utc>, window: Duration) -> usize {
    let mut events = events.lock().unwrap_or_else(PoisonError::into_inner);
    events.retain(|at| now.signed_duration_since(*at) < window);
    events.len()
}
