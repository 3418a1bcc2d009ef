//! Debounced share-link writes.
//!
//! The core never touches a real clock or address bar. Callers pass the
//! current [`Instant`] in and write whatever [`UrlSync::poll`] hands back.

use std::time::{Duration, Instant};

use crate::codec::PlanQuery;

/// Coalesces bursts of state changes into a single URL write.
///
/// The pending value is always the most recent notification, so the last
/// write reflects the final state. A pending value equal to the last
/// written one is dropped.
#[derive(Debug, Clone)]
pub struct UrlSync {
    debounce: Duration,
    pending: Option<(PlanQuery, Instant)>,
    last_written: Option<PlanQuery>,
}

impl UrlSync {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
            last_written: None,
        }
    }

    /// Record the query that is already in the address bar (e.g. on load).
    pub fn initialize(&mut self, current: PlanQuery) {
        self.last_written = Some(current);
        self.pending = None;
    }

    /// Record a new state. Restarts the quiet period.
    pub fn notify(&mut self, query: PlanQuery, now: Instant) {
        self.pending = Some((query, now));
    }

    /// The query to write, once the quiet period since the last
    /// notification has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<PlanQuery> {
        let (_, since) = self.pending.as_ref()?;
        if now.saturating_duration_since(*since) < self.debounce {
            return None;
        }
        self.take_pending()
    }

    /// The pending query, immediately.
    pub fn flush(&mut self) -> Option<PlanQuery> {
        self.take_pending()
    }

    /// Whether a write is waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Last query handed out for writing.
    #[must_use]
    pub fn last_written(&self) -> Option<&PlanQuery> {
        self.last_written.as_ref()
    }

    fn take_pending(&mut self) -> Option<PlanQuery> {
        let (query, _) = self.pending.take()?;
        if self.last_written.as_ref() == Some(&query) {
            return None;
        }
        self.last_written = Some(query.clone());
        Some(query)
    }
}
