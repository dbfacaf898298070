//! Idea listing service.
//!
//! Loads idea snapshots, resolves the requested ranking against the caller's
//! session sort state, and returns the ordered listing.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::ranking::{
    Criterion, Direction, IdeaSnapshot, RankingResolver, ResolvedOrdering, SessionSortState,
};
use crate::storage::Storage;

/// Input parameters for a listing request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingParams {
    /// Optional criterion name to rank (or re-rank) by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reorder: Option<String>,
    /// Optional session handle; anonymous callers keep no sort state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ListingParams {
    /// Create params for the default listing
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the criterion to rank by
    pub fn with_reorder(mut self, reorder: impl Into<String>) -> Self {
        self.reorder = Some(reorder.into());
        self
    }

    /// Set the session ID
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Result of a listing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Criterion the ideas are ranked by.
    pub criterion: Criterion,
    /// Direction the criterion was applied in.
    pub direction: Direction,
    /// Whether the request named the criterion.
    pub explicit: bool,
    /// Ideas in ranked order.
    pub ideas: Vec<IdeaSnapshot>,
}

impl Listing {
    /// Idea IDs in listing order.
    pub fn ids(&self) -> Vec<i64> {
        self.ideas.iter().map(|idea| idea.id).collect()
    }
}

/// Per-session async locks serializing sort state read-modify-write.
///
/// An entry lives only while some request holds or waits on it.
#[derive(Clone, Default)]
pub struct SessionLocks {
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SessionLocks {
    /// Get (or create) the lock for a session.
    pub fn acquire(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(session_id.to_string()).or_default())
    }

    /// Drop a session's entry if no request still holds its lock.
    pub fn prune(&self, session_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(session_id);
        }
    }

    /// Number of sessions with a live lock.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no session holds a lock entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Listing service handler
#[derive(Clone)]
pub struct ListingService<S> {
    storage: S,
    resolver: RankingResolver,
    locks: SessionLocks,
}

impl<S: Storage> ListingService<S> {
    /// Create a new listing service
    pub fn new(storage: S, resolver: RankingResolver) -> Self {
        Self {
            storage,
            resolver,
            locks: SessionLocks::default(),
        }
    }

    /// Process a listing request
    pub async fn list(&self, params: &ListingParams) -> AppResult<Listing> {
        let start = Instant::now();

        let snapshots = self.storage.load_snapshots().await?;
        let reorder = params
            .reorder
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        let session = params.session_id.as_deref().and_then(normalize_session);

        let ordering = match (session, reorder) {
            (Some(session_id), Some(name)) => {
                self.with_session_lock(session_id, || self.resolve_in_session(session_id, name))
                    .await?
            }
            (None, Some(name)) => {
                debug!("Listing without session, sort state not retained");
                self.resolver.resolve(Some(name), None)
            }
            // Default views never read or write session state.
            (_, None) => self.resolver.resolve(None, None),
        };

        let ideas = ordering.apply(&snapshots);

        info!(
            criterion = %ordering.criterion,
            direction = %ordering.direction,
            explicit = ordering.explicit,
            count = ideas.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Ideas listed"
        );

        Ok(Listing {
            criterion: ordering.criterion,
            direction: ordering.direction,
            explicit: ordering.explicit,
            ideas,
        })
    }

    /// Get the sort state recorded for a session
    pub async fn sort_state(&self, session_id: &str) -> AppResult<SessionSortState> {
        let session_id = require_session(session_id)?;
        Ok(self.storage.load_sort_state(session_id).await?)
    }

    /// Discard a session's sort state when the session ends
    pub async fn end_session(&self, session_id: &str) -> AppResult<()> {
        let session_id = require_session(session_id)?;

        self.with_session_lock(session_id, || async {
            self.storage
                .delete_sort_state(session_id)
                .await
                .map_err(AppError::from)
        })
        .await?;

        info!(session_id = %session_id, "Session sort state discarded");
        Ok(())
    }

    /// Resolve a named criterion against the session's stored state.
    async fn resolve_in_session(
        &self,
        session_id: &str,
        name: &str,
    ) -> AppResult<ResolvedOrdering> {
        let mut state = self.storage.load_sort_state(session_id).await?;
        let ordering = self.resolver.resolve(Some(name), Some(&mut state));
        if ordering.explicit {
            self.storage
                .save_sort_direction(session_id, ordering.criterion, ordering.direction)
                .await?;
        }
        Ok(ordering)
    }

    /// Run `f` holding the session's lock, then prune the entry if idle.
    async fn with_session_lock<T, F, Fut>(&self, session_id: &str, f: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let lock = self.locks.acquire(session_id);
        let result = {
            let _guard = lock.lock().await;
            f().await
        };
        drop(lock);
        self.locks.prune(session_id);
        result
    }
}

/// Trimmed session handle, or `None` if blank.
fn normalize_session(session_id: &str) -> Option<&str> {
    Some(session_id.trim()).filter(|id| !id.is_empty())
}

/// Session handle required by session operations.
fn require_session(session_id: &str) -> AppResult<&str> {
    normalize_session(session_id).ok_or_else(|| AppError::InvalidSession {
        message: "session_id must not be blank".to_string(),
    })
}
