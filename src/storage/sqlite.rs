use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, warn};

use super::{Idea, Storage};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};
use crate::ranking::{Criterion, Direction, IdeaSnapshot, SessionSortState};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed storage implementation
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create an in-memory database, used by tests.
    ///
    /// Limited to one connection that never expires, since every SQLite
    /// in-memory connection is its own database.
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_idea(&self, title: &str, created_at: DateTime<Utc>) -> StorageResult<Idea> {
        let result = sqlx::query(
            r#"
            INSERT INTO ideas (title, created_at)
            VALUES (?, ?)
            "#,
        )
        .bind(title)
        .bind(format_timestamp(created_at))
        .execute(&self.pool)
        .await?;

        Ok(Idea {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            created_at,
        })
    }

    async fn record_vote(&self, idea_id: i64) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO votes (idea_id, created_at)
            SELECT id, ? FROM ideas WHERE id = ?
            "#,
        )
        .bind(format_timestamp(Utc::now()))
        .bind(idea_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::IdeaNotFound { idea_id });
        }

        Ok(())
    }

    async fn record_comment(&self, idea_id: i64, body: &str) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (idea_id, body, created_at)
            SELECT id, ?, ? FROM ideas WHERE id = ?
            "#,
        )
        .bind(body)
        .bind(format_timestamp(Utc::now()))
        .bind(idea_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::IdeaNotFound { idea_id });
        }

        Ok(())
    }

    async fn load_snapshots(&self) -> StorageResult<Vec<IdeaSnapshot>> {
        let rows: Vec<SnapshotRow> = sqlx::query_as(
            r#"
            SELECT i.id, i.created_at,
                   (SELECT COUNT(*) FROM votes v WHERE v.idea_id = i.id) AS vote_count,
                   (SELECT COUNT(*) FROM comments c WHERE c.idea_id = i.id) AS comment_count
            FROM ideas i
            ORDER BY i.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(IdeaSnapshot::try_from).collect()
    }

    async fn load_sort_state(&self, session_id: &str) -> StorageResult<SessionSortState> {
        let rows: Vec<SortDirectionRow> = sqlx::query_as(
            r#"
            SELECT criterion, direction
            FROM session_sort_state
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let state = rows
            .into_iter()
            .filter_map(|row| {
                match (
                    row.criterion.parse::<Criterion>(),
                    row.direction.parse::<Direction>(),
                ) {
                    (Ok(criterion), Ok(direction)) => Some((criterion, direction)),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!(
                            session_id = %session_id,
                            error = %e,
                            "Skipping unreadable sort state row"
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(state)
    }

    async fn save_sort_direction(
        &self,
        session_id: &str,
        criterion: Criterion,
        direction: Direction,
    ) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO session_sort_state (session_id, criterion, direction, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(session_id, criterion)
            DO UPDATE SET direction = excluded.direction, updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(criterion.as_str())
        .bind(direction.as_str())
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_sort_state(&self, session_id: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM session_sort_state WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

// Internal row types for SQLx mapping
#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: i64,
    created_at: String,
    vote_count: i64,
    comment_count: i64,
}

impl TryFrom<SnapshotRow> for IdeaSnapshot {
    type Error = StorageError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::Query {
                message: format!("Invalid created_at for idea {}: {}", row.id, e),
            })?;

        Ok(IdeaSnapshot::new(row.id, created_at)
            .with_votes(u64::try_from(row.vote_count).unwrap_or_default())
            .with_comments(u64::try_from(row.comment_count).unwrap_or_default()))
    }
}

#[derive(sqlx::FromRow)]
struct SortDirectionRow {
    criterion: String,
    direction: String,
}
