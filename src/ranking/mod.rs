//! Ranking engine for the idea listing.
//!
//! This module provides:
//! - [`Criterion`] and [`Direction`]: the closed set of orderings and their directions
//! - [`CriterionRegistry`]: lookup of criteria by request name
//! - [`SessionSortState`]: the per-session criterion to direction map
//! - [`RankingResolver`]: turns a request into a [`ResolvedOrdering`], toggling directions
//! - [`order`]: total ordering of [`IdeaSnapshot`]s

mod order;
mod registry;
mod resolver;
mod state;

pub use order::order;
pub use registry::{CriterionRegistry, CriterionSummary};
pub use resolver::{RankingResolver, ResolvedOrdering};
pub use state::SessionSortState;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RankingError;

/// Read-only projection of an idea's ranking-relevant fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaSnapshot {
    /// Unique idea identifier, the ordering key of last resort.
    pub id: i64,
    /// When the idea was created.
    pub created_at: DateTime<Utc>,
    /// Number of votes cast on the idea.
    pub vote_count: u64,
    /// Number of comments on the idea.
    pub comment_count: u64,
}

impl IdeaSnapshot {
    /// Create a snapshot with no votes or comments
    pub fn new(id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            vote_count: 0,
            comment_count: 0,
        }
    }

    /// Set the vote count
    pub fn with_votes(mut self, vote_count: u64) -> Self {
        self.vote_count = vote_count;
        self
    }

    /// Set the comment count
    pub fn with_comments(mut self, comment_count: u64) -> Self {
        self.comment_count = comment_count;
        self
    }
}

/// Direction a criterion's comparator is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Smallest or earliest first.
    Ascending,
    /// Largest or latest first.
    Descending,
}

impl Direction {
    /// The opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }

    /// Apply this direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }

    /// Get the direction name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ascending" | "asc" => Ok(Direction::Ascending),
            "descending" | "desc" => Ok(Direction::Descending),
            _ => Err(RankingError::UnknownDirection {
                value: s.to_string(),
            }),
        }
    }
}

/// A named rule for ordering ideas.
///
/// Variant order is the registry listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// By comment count.
    Comments,
    /// By vote count.
    Votes,
    /// By creation time.
    Age,
}

impl Criterion {
    /// Every criterion, in listing order.
    pub const ALL: [Criterion; 3] = [Criterion::Comments, Criterion::Votes, Criterion::Age];

    /// Get the criterion name as used in requests
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Comments => "comments",
            Criterion::Votes => "votes",
            Criterion::Age => "age",
        }
    }

    /// Direction used when a session has never requested this criterion.
    pub fn default_direction(&self) -> Direction {
        match self {
            Criterion::Comments | Criterion::Votes => Direction::Descending,
            Criterion::Age => Direction::Ascending,
        }
    }

    /// Compare two snapshots in ascending order, ties broken by `id`.
    pub fn compare(&self, a: &IdeaSnapshot, b: &IdeaSnapshot) -> Ordering {
        let primary = match self {
            Criterion::Comments => a.comment_count.cmp(&b.comment_count),
            Criterion::Votes => a.vote_count.cmp(&b.vote_count),
            Criterion::Age => a.created_at.cmp(&b.created_at),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// Short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Criterion::Comments => "Most commented ideas first",
            Criterion::Votes => "Most voted ideas first",
            Criterion::Age => "Oldest ideas first",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Criterion {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comments" => Ok(Criterion::Comments),
            "votes" => Ok(Criterion::Votes),
            "age" => Ok(Criterion::Age),
            _ => Err(RankingError::UnknownCriterion {
                name: s.to_string(),
            }),
        }
    }
}
