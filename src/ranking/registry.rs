//! Criterion registry for request-name lookup.

use serde::{Deserialize, Serialize};

use super::{Criterion, Direction};
use crate::error::RankingResult;

/// Registry of the ranking criteria a listing request may name.
///
/// The set is fixed at build time; the registry only adds name lookup,
/// the default criterion, and summaries for clients.
#[derive(Debug, Clone, Copy)]
pub struct CriterionRegistry {
    default: Criterion,
}

/// Brief criterion summary for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionSummary {
    /// Name used in `reorder` requests.
    pub name: String,
    /// Direction applied on first request in a session.
    pub default_direction: Direction,
    /// Description.
    pub description: String,
    /// Whether this criterion is used when none is requested.
    pub is_default: bool,
}

impl CriterionRegistry {
    /// Create the registry; the default criterion is `comments`.
    pub fn new() -> Self {
        Self {
            default: Criterion::Comments,
        }
    }

    /// Look up a criterion by request name.
    ///
    /// # Errors
    /// Returns [`RankingError::UnknownCriterion`] if no criterion has that name.
    pub fn lookup(&self, name: &str) -> RankingResult<Criterion> {
        name.parse()
    }

    /// The criterion applied when a request names none.
    pub fn default_criterion(&self) -> Criterion {
        self.default
    }

    /// List all criteria in registry order.
    pub fn list(&self) -> Vec<CriterionSummary> {
        Criterion::ALL
            .into_iter()
            .map(|c| CriterionSummary {
                name: c.as_str().to_string(),
                default_direction: c.default_direction(),
                description: c.description().to_string(),
                is_default: c == self.default,
            })
            .collect()
    }

    /// Get the number of registered criteria.
    pub fn count(&self) -> usize {
        Criterion::ALL.len()
    }
}

impl Default for CriterionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
