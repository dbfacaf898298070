//! # Idea Ranking
//!
//! Listing service for user-submitted ideas, ranked by engagement or age,
//! with per-session sort-direction toggling.
//!
//! ## Features
//!
//! - **Ranking criteria**: `comments`, `votes` and `age`, each with its own default direction
//! - **Re-ranking**: naming the same criterion again in a session reverses its direction
//! - **Deterministic order**: every collision is broken by idea id
//! - **Session state**: directions persist per session in SQLite until the session ends
//!
//! ## Architecture
//!
//! ```text
//! MCP Client → McpServer (stdio) → ListingService → RankingResolver → order()
//!                                        ↓
//!                                  SQLite (ideas, sort state)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use idea_ranking::{Config, AppState, McpServer};
//! use idea_ranking::storage::SqliteStorage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let state = Arc::new(AppState::new(storage));
//!     McpServer::new(state).run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management.
#[allow(missing_docs)]
pub mod config;
/// Error types and result aliases for the application.
#[allow(missing_docs)]
pub mod error;
/// Listing service orchestrating storage and ranking.
pub mod listing;
/// Ranking criteria, direction state and ordering.
pub mod ranking;
/// MCP server implementation and request handling.
pub mod server;
/// SQLite storage layer for persistence.
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use listing::{Listing, ListingParams, ListingService};
pub use server::{AppState, McpServer, SharedState};
