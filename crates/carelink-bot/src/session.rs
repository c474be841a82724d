// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation state, owned by the dialogue engine.
//!
//! Each user gets an `Arc<tokio::sync::Mutex<UserSession>>`; an event
//! handler holds the user's lock for its whole read-modify-write, so two
//! rapid messages from the same user serialize instead of losing updates.
//! Sessions are volatile (process lifetime only) and evicted after a
//! configurable idle period.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use carelink_core::types::FeedbackCategory;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Dialogue position of one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    /// Top-level menu; the next plain text is treated as an implicit /start.
    #[default]
    Start,
    /// Category prompt was rendered; expecting a category synonym.
    AwaitingCategory,
    /// Category chosen; the next message is the submission body.
    AwaitingMessage,
}

/// Volatile conversation state for one user.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: i64,
    pub stage: Stage,
    /// The chosen category, carried from the selection step to the
    /// submission step. Cleared on every reset.
    pub pending_category: Option<FeedbackCategory>,
    pub last_seen: DateTime<Utc>,
}

impl UserSession {
    fn new(user_id: i64) -> Self {
        Self {
            user_id,
            stage: Stage::Start,
            pending_category: None,
            last_seen: Utc::now(),
        }
    }

    /// Back to the top-level state with empty scratch data. Called after
    /// every submission attempt, successful or not.
    pub fn reset(&mut self) {
        self.stage = Stage::Start;
        self.pending_category = None;
    }
}

/// The per-user session table.
///
/// The outer std mutex only guards map membership; per-user work happens
/// under the inner async mutex and never while the map lock is held.
pub struct SessionTable {
    inner: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<UserSession>>>>,
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the session handle for a user, creating it lazily on first
    /// contact.
    pub fn session(&self, user_id: i64) -> Arc<tokio::sync::Mutex<UserSession>> {
        let mut map = self.inner.lock().expect("session table poisoned");
        map.entry(user_id)
            .or_insert_with(|| {
                debug!(user_id, "creating session");
                Arc::new(tokio::sync::Mutex::new(UserSession::new(user_id)))
            })
            .clone()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("session table poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evicts sessions unseen for longer than `max_idle`. A session whose
    /// lock is currently held (an in-flight handler) is skipped and picked
    /// up by a later sweep. Returns the number of evicted sessions.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut map = self.inner.lock().expect("session table poisoned");
        let before = map.len();
        map.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.last_seen >= cutoff,
            Err(_) => true,
        });
        let evicted = before - map.len();
        if evicted > 0 {
            debug!(evicted, remaining = map.len(), "evicted idle sessions");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_created_lazily_and_shared() {
        let table = SessionTable::new();
        assert!(table.is_empty());

        let first = table.session(1);
        let again = table.session(1);
        assert_eq!(table.len(), 1);
        assert!(Arc::ptr_eq(&first, &again));

        table.session(2);
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn new_session_starts_at_start_with_empty_scratch() {
        let table = SessionTable::new();
        let session = table.session(5);
        let guard = session.lock().await;
        assert_eq!(guard.stage, Stage::Start);
        assert!(guard.pending_category.is_none());
    }

    #[tokio::test]
    async fn reset_clears_stage_and_scratch() {
        let table = SessionTable::new();
        let session = table.session(5);
        let mut guard = session.lock().await;
        guard.stage = Stage::AwaitingMessage;
        guard.pending_category = Some(FeedbackCategory::Review);

        guard.reset();
        assert_eq!(guard.stage, Stage::Start);
        assert!(guard.pending_category.is_none());
    }

    #[tokio::test]
    async fn rapid_same_user_updates_serialize() {
        let table = Arc::new(SessionTable::new());

        let base = Utc::now();
        {
            let session = table.session(1);
            session.lock().await.last_seen = base;
        }

        let mut handles = Vec::new();
        for _ in 0..20 {
            let table = table.clone();
            handles.push(tokio::spawn(async move {
                let session = table.session(1);
                let mut guard = session.lock().await;
                // Read-modify-write under the per-user lock; the yield
                // would expose lost updates if the lock were absent.
                let seen = guard.last_seen;
                tokio::task::yield_now().await;
                guard.last_seen = seen + Duration::seconds(1);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let session = table.session(1);
        let guard = session.lock().await;
        assert_eq!(
            guard.last_seen,
            base + Duration::seconds(20),
            "all 20 updates must be applied"
        );
    }

    #[tokio::test]
    async fn evict_removes_stale_but_not_fresh() {
        let table = SessionTable::new();

        {
            let stale = table.session(1);
            let mut guard = stale.lock().await;
            guard.last_seen = Utc::now() - Duration::hours(48);
        }
        table.session(2); // fresh

        let evicted = table.evict_idle(Duration::hours(24));
        assert_eq!(evicted, 1);
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn evict_skips_locked_sessions() {
        let table = SessionTable::new();
        let session = table.session(1);
        {
            let mut guard = session.lock().await;
            guard.last_seen = Utc::now() - Duration::hours(48);
        }

        let guard = session.lock().await;
        let evicted = table.evict_idle(Duration::hours(24));
        assert_eq!(evicted, 0, "in-flight session must survive the sweep");
        drop(guard);

        assert_eq!(table.evict_idle(Duration::hours(24)), 1);
    }
}
