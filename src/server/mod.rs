//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state management

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;

use crate::listing::ListingService;
use crate::ranking::{CriterionRegistry, RankingResolver};
use crate::storage::SqliteStorage;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// SQLite storage backend.
    pub storage: SqliteStorage,
    /// Ranking criteria available to listing requests.
    pub registry: CriterionRegistry,
    /// Idea listing service.
    pub listing: ListingService<SqliteStorage>,
}

impl AppState {
    /// Create new application state
    pub fn new(storage: SqliteStorage) -> Self {
        let registry = CriterionRegistry::new();
        let listing = ListingService::new(storage.clone(), RankingResolver::new(registry));

        tracing::info!(
            criteria = registry.count(),
            default_criterion = %registry.default_criterion(),
            "AppState initialized"
        );

        Self {
            storage,
            registry,
            listing,
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use chrono::Utc;

    #[tokio::test]
    async fn test_app_state_new() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        let state = AppState::new(storage);

        assert_eq!(state.registry.count(), 3);
        assert_eq!(state.registry.default_criterion().as_str(), "comments");
    }

    #[tokio::test]
    async fn test_app_state_listing_uses_shared_storage() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        let state = AppState::new(storage);

        let idea = state.storage.create_idea("Bike lanes", Utc::now()).await.unwrap();
        let listing = state
            .listing
            .list(&crate::listing::ListingParams::new())
            .await
            .unwrap();

        assert_eq!(listing.ids(), vec![idea.id]);
    }

    #[tokio::test]
    async fn test_shared_state_type() {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        let shared: SharedState = Arc::new(AppState::new(storage));

        let shared2 = Arc::clone(&shared);
        assert_eq!(Arc::strong_count(&shared), 2);
        drop(shared2);
        assert_eq!(Arc::strong_count(&shared), 1);
    }
}
