//! Storage layer for ideas and session sort state.
//!
//! This module provides SQLite-based storage that feeds idea snapshots to the
//! ranking engine and persists each session's criterion directions between
//! listing requests.

mod sqlite;

pub use sqlite::SqliteStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;
use crate::ranking::{Criterion, Direction, IdeaSnapshot, SessionSortState};

/// A stored idea.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idea {
    /// Unique idea identifier.
    pub id: i64,
    /// Idea title.
    pub title: String,
    /// When the idea was created.
    pub created_at: DateTime<Utc>,
}

/// Storage backend trait for the listing service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    // Idea operations

    /// Store a new idea created at `created_at`, returning it with its assigned ID.
    async fn create_idea(&self, title: &str, created_at: DateTime<Utc>) -> StorageResult<Idea>;
    /// Record a vote on an idea.
    async fn record_vote(&self, idea_id: i64) -> StorageResult<()>;
    /// Record a comment on an idea.
    async fn record_comment(&self, idea_id: i64, body: &str) -> StorageResult<()>;
    /// Load every idea with its vote and comment counts, by ID.
    async fn load_snapshots(&self) -> StorageResult<Vec<IdeaSnapshot>>;

    // Session sort state operations

    /// Load a session's recorded directions (empty if none).
    async fn load_sort_state(&self, session_id: &str) -> StorageResult<SessionSortState>;
    /// Record the direction last applied for a criterion in a session.
    async fn save_sort_direction(
        &self,
        session_id: &str,
        criterion: Criterion,
        direction: Direction,
    ) -> StorageResult<()>;
    /// Discard all recorded directions of a session.
    async fn delete_sort_state(&self, session_id: &str) -> StorageResult<()>;
}
