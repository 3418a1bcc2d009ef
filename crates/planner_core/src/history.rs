//! Bounded undo/redo stacks.

use std::collections::VecDeque;

/// Undo/redo history of whole-state snapshots.
///
/// `push` records the state *before* a change. Pushing clears the redo
/// stack; when more than `limit` snapshots are held the oldest is dropped.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: Vec<T>,
    limit: usize,
}

impl<T> History<T> {
    /// Create a history holding at most `limit` undo steps.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(limit.min(64)),
            future: Vec::new(),
            limit,
        }
    }

    /// Record the state before a committed change.
    pub fn push(&mut self, snapshot: T) {
        self.future.clear();
        if self.limit == 0 {
            return;
        }
        if self.past.len() == self.limit {
            self.past.pop_front();
        }
        self.past.push_back(snapshot);
    }

    /// Step back: hand in the current state, get the previous one.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    /// Step forward: hand in the current state, get the next one.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        Some(next)
    }

    /// Whether an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps held.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps held.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Maximum undo steps.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Change the limit, dropping the oldest steps if needed.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        while self.past.len() > limit {
            self.past.pop_front();
        }
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
