//! Integration tests for SQLite storage layer
//!
//! Tests idea and sort state operations using in-memory and file-backed
//! SQLite databases.

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use idea_ranking::config::DatabaseConfig;
use idea_ranking::error::StorageError;
use idea_ranking::ranking::{Criterion, Direction};
use idea_ranking::storage::{SqliteStorage, Storage};

/// Create an in-memory storage instance for testing
async fn create_test_storage() -> SqliteStorage {
    SqliteStorage::new_in_memory()
        .await
        .expect("Failed to create in-memory storage")
}

#[cfg(test)]
mod idea_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_idea_assigns_increasing_ids() {
        let storage = create_test_storage().await;
        let now = Utc::now();

        let first = storage.create_idea("First", now).await.unwrap();
        let second = storage.create_idea("Second", now).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.title, "First");
        assert_eq!(first.created_at, now);
    }

    #[tokio::test]
    async fn test_snapshots_count_votes_and_comments() {
        let storage = create_test_storage().await;
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let idea = storage.create_idea("Counted", created_at).await.unwrap();
        let quiet = storage
            .create_idea("Quiet", created_at + Duration::minutes(1))
            .await
            .unwrap();

        storage.record_vote(idea.id).await.unwrap();
        storage.record_vote(idea.id).await.unwrap();
        storage.record_vote(idea.id).await.unwrap();
        storage.record_comment(idea.id, "nice").await.unwrap();

        let snapshots = storage.load_snapshots().await.unwrap();
        assert_eq!(snapshots.len(), 2);

        assert_eq!(snapshots[0].id, idea.id);
        assert_eq!(snapshots[0].vote_count, 3);
        assert_eq!(snapshots[0].comment_count, 1);
        assert_eq!(snapshots[0].created_at, created_at);

        assert_eq!(snapshots[1].id, quiet.id);
        assert_eq!(snapshots[1].vote_count, 0);
        assert_eq!(snapshots[1].comment_count, 0);
    }

    #[tokio::test]
    async fn test_subsecond_creation_times_are_preserved() {
        let storage = create_test_storage().await;
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let later = base + Duration::nanoseconds(1_500);

        storage.create_idea("Base", base).await.unwrap();
        storage.create_idea("Later", later).await.unwrap();

        let snapshots = storage.load_snapshots().await.unwrap();
        assert_eq!(snapshots[1].created_at, later);
        assert!(snapshots[0].created_at < snapshots[1].created_at);
    }

    #[tokio::test]
    async fn test_vote_on_missing_idea() {
        let storage = create_test_storage().await;

        let err = storage.record_vote(404).await.unwrap_err();
        assert!(matches!(err, StorageError::IdeaNotFound { idea_id: 404 }));
    }

    #[tokio::test]
    async fn test_comment_on_missing_idea() {
        let storage = create_test_storage().await;

        let err = storage.record_comment(7, "hello").await.unwrap_err();
        assert!(matches!(err, StorageError::IdeaNotFound { idea_id: 7 }));
        assert!(storage.load_snapshots().await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod sort_state_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_unknown_session_has_empty_state() {
        let storage = create_test_storage().await;

        let state = storage.load_sort_state("nobody").await.unwrap();
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_overwrite_direction() {
        let storage = create_test_storage().await;

        storage
            .save_sort_direction("sess", Criterion::Votes, Direction::Descending)
            .await
            .unwrap();
        storage
            .save_sort_direction("sess", Criterion::Age, Direction::Ascending)
            .await
            .unwrap();
        storage
            .save_sort_direction("sess", Criterion::Votes, Direction::Ascending)
            .await
            .unwrap();

        let state = storage.load_sort_state("sess").await.unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.get(Criterion::Votes), Some(Direction::Ascending));
        assert_eq!(state.get(Criterion::Age), Some(Direction::Ascending));
        assert_eq!(state.get(Criterion::Comments), None);
    }

    #[tokio::test]
    async fn test_delete_only_affects_one_session() {
        let storage = create_test_storage().await;

        storage
            .save_sort_direction("a", Criterion::Comments, Direction::Ascending)
            .await
            .unwrap();
        storage
            .save_sort_direction("b", Criterion::Comments, Direction::Descending)
            .await
            .unwrap();

        storage.delete_sort_state("a").await.unwrap();

        assert!(storage.load_sort_state("a").await.unwrap().is_empty());
        assert_eq!(
            storage
                .load_sort_state("b")
                .await
                .unwrap()
                .get(Criterion::Comments),
            Some(Direction::Descending)
        );
    }

    #[tokio::test]
    async fn test_delete_missing_session_is_ok() {
        let storage = create_test_storage().await;
        assert!(storage.delete_sort_state("ghost").await.is_ok());
    }
}

#[cfg(test)]
mod file_database_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_file_database_persists_between_opens() {
        let dir = tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("data").join("ideas.db"),
            max_connections: 2,
        };

        let idea_id = {
            let storage = SqliteStorage::new(&config).await.unwrap();
            let idea = storage.create_idea("Durable", Utc::now()).await.unwrap();
            storage.record_comment(idea.id, "still here").await.unwrap();
            storage
                .save_sort_direction("sess", Criterion::Age, Direction::Descending)
                .await
                .unwrap();
            storage.pool().close().await;
            idea.id
        };

        assert!(config.path.exists());

        let storage = SqliteStorage::new(&config).await.unwrap();
        let snapshots = storage.load_snapshots().await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].id, idea_id);
        assert_eq!(snapshots[0].comment_count, 1);

        let state = storage.load_sort_state("sess").await.unwrap();
        assert_eq!(state.get(Criterion::Age), Some(Direction::Descending));
    }
}
