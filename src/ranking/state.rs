use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Criterion, Direction};

/// Last-applied direction per criterion for one session.
///
/// A missing entry means the session never requested that criterion
/// explicitly, so its default direction applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSortState {
    directions: BTreeMap<Criterion, Direction>,
}

impl SessionSortState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Last direction applied for `criterion`, if any.
    pub fn get(&self, criterion: Criterion) -> Option<Direction> {
        self.directions.get(&criterion).copied()
    }

    /// Record `direction` for `criterion`, replacing any previous value.
    pub fn set(&mut self, criterion: Criterion, direction: Direction) {
        self.directions.insert(criterion, direction);
    }

    /// Iterate entries in criterion order.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, Direction)> + '_ {
        self.directions.iter().map(|(c, d)| (*c, *d))
    }

    /// Number of criteria with a recorded direction.
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// Whether no criterion has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

impl FromIterator<(Criterion, Direction)> for SessionSortState {
    fn from_iter<I: IntoIterator<Item = (Criterion, Direction)>>(iter: I) -> Self {
        Self {
            directions: iter.into_iter().collect(),
        }
    }
}
