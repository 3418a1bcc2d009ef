//! Session-unique unit identifiers.

use crate::unit::UnitId;

/// Issues unit ids that never repeat within a session.
///
/// Each id combines the session seed (typically a timestamp supplied by
/// the caller), a monotonic counter and a position tag, so two ids from
/// the same generator always differ even when the tag repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    session: u64,
    counter: u64,
}

impl IdGenerator {
    /// Create a generator for a session.
    #[must_use]
    pub const fn new(session: u64) -> Self {
        Self {
            session,
            counter: 0,
        }
    }

    /// Issue the next id. `tag` records where the unit came from
    /// (e.g. a grid cell or a roster entry).
    pub fn next_id(&mut self, tag: &str) -> UnitId {
        self.counter += 1;
        UnitId::new(format!("{:x}-{}-{tag}", self.session, self.counter))
    }

    /// Number of ids issued so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.counter
    }
}
