//! Session-wide bookkeeping of defeated opponents and consumed locations.
//!
//! Both sets only ever grow. Once an opponent is defeated or a location
//! consumed, no encounter can be started against it again.

use crate::opponent::OpponentId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Identity of a map location that hosts an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub Uuid);

impl LocationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Progress {
    defeated: HashSet<OpponentId>,
    consumed: HashSet<LocationId>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_defeated(&self, id: OpponentId) -> bool {
        self.defeated.contains(&id)
    }

    /// Record a defeat. Returns `false` if it was already recorded.
    pub fn mark_defeated(&mut self, id: OpponentId) -> bool {
        self.defeated.insert(id)
    }

    pub fn defeated_count(&self) -> usize {
        self.defeated.len()
    }

    pub fn is_consumed(&self, id: LocationId) -> bool {
        self.consumed.contains(&id)
    }

    /// Retire a location. Returns `false` if it was already retired.
    pub fn mark_consumed(&mut self, id: LocationId) -> bool {
        self.consumed.insert(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_monotonic() {
        let mut progress = Progress::new();
        let teacher = OpponentId::new();
        assert!(!progress.is_defeated(teacher));
        assert!(progress.mark_defeated(teacher));
        assert!(!progress.mark_defeated(teacher));
        assert!(progress.is_defeated(teacher));
        assert_eq!(progress.defeated_count(), 1);

        let room = LocationId::new();
        assert!(progress.mark_consumed(room));
        assert!(!progress.mark_consumed(room));
        assert!(progress.is_consumed(room));
        assert!(!progress.is_consumed(LocationId::new()));
    }
}
