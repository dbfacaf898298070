use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{order, Criterion, CriterionRegistry, Direction, IdeaSnapshot, SessionSortState};

/// Concrete ordering chosen for one listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOrdering {
    /// Criterion to rank by.
    pub criterion: Criterion,
    /// Direction to apply it in.
    pub direction: Direction,
    /// Whether the request named the criterion (and so updated session state).
    pub explicit: bool,
}

impl ResolvedOrdering {
    /// Order `snapshots` by this criterion and direction.
    pub fn apply(&self, snapshots: &[IdeaSnapshot]) -> Vec<IdeaSnapshot> {
        order(snapshots, self.criterion, self.direction)
    }
}

/// Resolves listing requests against a session's sort state.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingResolver {
    registry: CriterionRegistry,
}

impl RankingResolver {
    /// Create a resolver over `registry`
    pub fn new(registry: CriterionRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a request to a criterion and direction.
    ///
    /// A missing, blank or unknown name yields the default criterion in its
    /// default direction and leaves `state` untouched. A known name applies
    /// its default direction the first time, then flips relative to the last
    /// direction recorded for that criterion, and records the result.
    ///
    /// `state` is `None` for callers without a session: every explicit
    /// request then behaves as the first one.
    pub fn resolve(
        &self,
        requested: Option<&str>,
        state: Option<&mut SessionSortState>,
    ) -> ResolvedOrdering {
        let requested = requested.map(str::trim).filter(|name| !name.is_empty());

        let criterion = match requested.map(|name| self.registry.lookup(name)) {
            Some(Ok(criterion)) => criterion,
            Some(Err(e)) => {
                debug!(error = %e, "Falling back to default ranking criterion");
                return self.default_ordering();
            }
            None => return self.default_ordering(),
        };

        let direction = match state {
            Some(state) => {
                let direction = state
                    .get(criterion)
                    .map_or(criterion.default_direction(), Direction::toggle);
                state.set(criterion, direction);
                direction
            }
            None => criterion.default_direction(),
        };

        debug!(
            criterion = %criterion,
            direction = %direction,
            "Resolved explicit ranking request"
        );

        ResolvedOrdering {
            criterion,
            direction,
            explicit: true,
        }
    }

    fn default_ordering(&self) -> ResolvedOrdering {
        let criterion = self.registry.default_criterion();
        ResolvedOrdering {
            criterion,
            direction: criterion.default_direction(),
            explicit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> RankingResolver {
        RankingResolver::new(CriterionRegistry::new())
    }

    #[test]
    fn test_no_criterion_uses_default() {
        let mut state = SessionSortState::new();
        let resolved = resolver().resolve(None, Some(&mut state));

        assert_eq!(resolved.criterion, Criterion::Comments);
        assert_eq!(resolved.direction, Direction::Descending);
        assert!(!resolved.explicit);
        assert!(state.is_empty());
    }

    #[test]
    fn test_blank_criterion_is_treated_as_absent() {
        let mut state = SessionSortState::new();
        let resolved = resolver().resolve(Some("   "), Some(&mut state));

        assert!(!resolved.explicit);
        assert!(state.is_empty());
    }

    #[test]
    fn test_unknown_criterion_falls_back_without_mutation() {
        let mut state = SessionSortState::new();
        state.set(Criterion::Votes, Direction::Ascending);
        let before = state.clone();

        let resolved = resolver().resolve(Some("trending"), Some(&mut state));

        assert_eq!(resolved.criterion, Criterion::Comments);
        assert_eq!(resolved.direction, Direction::Descending);
        assert!(!resolved.explicit);
        assert_eq!(state, before);
    }

    #[test]
    fn test_default_request_never_mutates_prior_state() {
        let mut state = SessionSortState::new();
        state.set(Criterion::Comments, Direction::Ascending);
        let before = state.clone();

        let resolved = resolver().resolve(None, Some(&mut state));

        // The default view ignores the stored comments direction.
        assert_eq!(resolved.direction, Direction::Descending);
        assert_eq!(state, before);
    }

    #[test]
    fn test_toggle_involution() {
        let resolver = resolver();
        let mut state = SessionSortState::new();

        for criterion in Criterion::ALL {
            let first = resolver.resolve(Some(criterion.as_str()), Some(&mut state));
            let second = resolver.resolve(Some(criterion.as_str()), Some(&mut state));
            let third = resolver.resolve(Some(criterion.as_str()), Some(&mut state));

            assert_eq!(first.direction, criterion.default_direction());
            assert_eq!(second.direction, first.direction.toggle());
            assert_eq!(third.direction, first.direction);
            assert!(first.explicit && second.explicit && third.explicit);
        }
    }

    #[test]
    fn test_explicit_request_records_direction() {
        let mut state = SessionSortState::new();
        let resolved = resolver().resolve(Some("age"), Some(&mut state));

        assert_eq!(resolved.direction, Direction::Ascending);
        assert_eq!(state.get(Criterion::Age), Some(Direction::Ascending));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_per_criterion_isolation() {
        let resolver = resolver();
        let mut state = SessionSortState::new();

        resolver.resolve(Some("votes"), Some(&mut state));
        resolver.resolve(Some("votes"), Some(&mut state));
        assert_eq!(state.get(Criterion::Votes), Some(Direction::Ascending));

        // Switching criteria does not touch the votes entry.
        let comments = resolver.resolve(Some("comments"), Some(&mut state));
        assert_eq!(comments.direction, Direction::Descending);
        assert_eq!(state.get(Criterion::Votes), Some(Direction::Ascending));

        // Coming back to votes flips from votes' own last direction.
        let votes = resolver.resolve(Some("votes"), Some(&mut state));
        assert_eq!(votes.direction, Direction::Descending);
        assert_eq!(state.get(Criterion::Comments), Some(Direction::Descending));
    }

    #[test]
    fn test_explicit_default_criterion_toggles() {
        let resolver = resolver();
        let mut state = SessionSortState::new();

        let first = resolver.resolve(Some("comments"), Some(&mut state));
        let second = resolver.resolve(Some("comments"), Some(&mut state));

        assert_eq!(first.direction, Direction::Descending);
        assert_eq!(second.direction, Direction::Ascending);
    }

    #[test]
    fn test_without_session_every_request_is_first() {
        let resolver = resolver();

        for _ in 0..3 {
            let resolved = resolver.resolve(Some("votes"), None);
            assert_eq!(resolved.criterion, Criterion::Votes);
            assert_eq!(resolved.direction, Direction::Descending);
            assert!(resolved.explicit);
        }
    }
}
