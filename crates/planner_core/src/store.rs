//! The planner's state container.
//!
//! [`PlannerStore`] is the one place that commits state. Each dispatch:
//! 1. Runs the pure reducer on the current plan
//! 2. Snapshots the old plan into the undo history
//! 3. Hands the newly encoded share link to the URL debouncer
//!
//! Time is passed in by the caller; the store never reads a clock.

use std::time::Instant;

use tracing::{debug, warn};

use crate::actions::{reduce, Action, Outcome, ReduceContext};
use crate::codec::{decode_plan, PlanQuery, SkippedSegment};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::formation::Formation;
use crate::history::History;
use crate::ids::IdGenerator;
use crate::plan::PlanState;
use crate::registry::UnitRegistry;
use crate::roster::Roster;
use crate::url_sync::UrlSync;

/// Owns the plan and every collaborator needed to change it.
#[derive(Debug)]
pub struct PlannerStore {
    registry: UnitRegistry,
    config: PlannerConfig,
    ids: IdGenerator,
    state: PlanState,
    history: History<PlanState>,
    url: UrlSync,
}

impl PlannerStore {
    /// Create a store with an empty plan.
    ///
    /// `session` seeds unit ids; pass something that differs between
    /// sessions, such as a timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidConfig`] if `config` is inconsistent.
    pub fn new(registry: UnitRegistry, config: PlannerConfig, session: u64) -> Result<Self> {
        config.validate()?;
        let state = PlanState::new(config.default_formation_name.clone());
        Ok(Self {
            history: History::new(config.history_limit),
            url: UrlSync::new(config.url_debounce()),
            ids: IdGenerator::new(session),
            registry,
            config,
            state,
        })
    }

    /// Create a store from share-link parameters.
    ///
    /// The decoded link counts as already written, so nothing is synced
    /// back until the first change.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidConfig`] if `config` is inconsistent.
    /// Bad link segments are not errors; they come back in the list.
    pub fn from_query(
        registry: UnitRegistry,
        config: PlannerConfig,
        session: u64,
        formation: Option<&str>,
        units: Option<&str>,
    ) -> Result<(Self, Vec<SkippedSegment>)> {
        let mut store = Self::new(registry, config, session)?;
        let decoded = decode_plan(formation, units, &store.registry, &mut store.ids, &store.config);
        store.state = decoded.value;
        store.url.initialize(store.query());
        if !decoded.skipped.is_empty() {
            debug!(skipped = decoded.skipped.len(), "Share link loaded with skipped segments");
        }
        Ok((store, decoded.skipped))
    }

    /// Apply an action.
    ///
    /// A changed plan is snapshotted for undo and queued for the URL.
    ///
    /// # Errors
    ///
    /// Propagates the reducer's error; the plan is unchanged.
    pub fn dispatch(&mut self, action: &Action, now: Instant) -> Result<Outcome> {
        let mut ctx = ReduceContext {
            registry: &self.registry,
            config: &self.config,
            ids: &mut self.ids,
        };
        let (next, outcome) = match reduce(&self.state, action, &mut ctx) {
            Ok(result) => result,
            Err(err) => {
                log_rejection(action, &err);
                return Err(err);
            }
        };

        if let Outcome::PartiallyAdmitted(check) = &outcome {
            warn!(
                action = action.label(),
                requested = check.requested,
                admitted = check.max_admittable,
                "{}",
                check.user_message()
            );
        }
        if !outcome.changed() {
            return Ok(outcome);
        }

        #[cfg(feature = "debug-validation")]
        next.check_invariants(self.config.limits())?;

        let previous = std::mem::replace(&mut self.state, next);
        self.history.push(previous);
        self.queue_url(now);
        debug!(
            action = action.label(),
            roster = self.state.roster().len(),
            placed = self.state.formation().placed_count(),
            power = self.state.formation().power(),
            "Committed action"
        );
        Ok(outcome)
    }

    /// Restore the plan before the last committed action.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::NothingToUndo`] when the history is empty.
    pub fn undo(&mut self, now: Instant) -> Result<()> {
        let previous = self
            .history
            .undo(self.state.clone())
            .ok_or(PlannerError::NothingToUndo)?;
        self.state = previous;
        self.queue_url(now);
        debug!(undo_left = self.history.undo_len(), "Undo");
        Ok(())
    }

    /// Re-apply the last undone action.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::NothingToRedo`] when nothing was undone.
    pub fn redo(&mut self, now: Instant) -> Result<()> {
        let next = self
            .history
            .redo(self.state.clone())
            .ok_or(PlannerError::NothingToRedo)?;
        self.state = next;
        self.queue_url(now);
        debug!(redo_left = self.history.redo_len(), "Redo");
        Ok(())
    }

    /// Whether [`undo`](Self::undo) would succeed.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`redo`](Self::redo) would succeed.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The URL write due at `now`, if any.
    pub fn poll_url(&mut self, now: Instant) -> Option<PlanQuery> {
        self.url.poll(now)
    }

    /// The pending URL write, without waiting for the debounce.
    pub fn flush_url(&mut self) -> Option<PlanQuery> {
        self.url.flush()
    }

    /// Share-link parameters for the current plan.
    #[must_use]
    pub fn query(&self) -> PlanQuery {
        PlanQuery::encode(&self.state, &self.registry)
    }

    /// Current plan.
    #[must_use]
    pub fn state(&self) -> &PlanState {
        &self.state
    }

    /// Current roster.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        self.state.roster()
    }

    /// Current formation.
    #[must_use]
    pub fn formation(&self) -> &Formation {
        self.state.formation()
    }

    /// Unit catalog.
    #[must_use]
    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn queue_url(&mut self, now: Instant) {
        let query = self.query();
        self.url.notify(query, now);
    }
}

fn log_rejection(action: &Action, err: &PlannerError) {
    match err {
        PlannerError::ValidationRejected(check) => {
            warn!(action = action.label(), reason = ?check.reason, "{}", check.user_message());
        }
        err if err.is_user_facing() => warn!(action = action.label(), error = %err, "Action rejected"),
        err => debug!(action = action.label(), error = %err, "Action ignored"),
    }
}
