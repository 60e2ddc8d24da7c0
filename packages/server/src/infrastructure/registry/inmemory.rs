//! In-memory user registry.
//!
//! Sessions are stored in a `BTreeMap` keyed by [`SessionId`]. Ids grow
//! monotonically, so map order is connection order and removal needs no scan.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    DisplayName, ServerMetrics, Session, SessionId, StatsSnapshot, Timestamp, UserRegistry,
};

#[derive(Debug, Default)]
struct RegistryState {
    sessions: BTreeMap<SessionId, Session>,
    metrics: ServerMetrics,
}

/// In-memory [`UserRegistry`] guarded by a single mutex.
///
/// Broadcasting only enqueues onto each peer's outbound channel, so no socket
/// write happens while the lock is held.
#[derive(Debug, Default)]
pub struct InMemoryUserRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryUserRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRegistry for InMemoryUserRegistry {
    async fn add(&self, session: Session) -> usize {
        let mut state = self.state.lock().await;
        tracing::debug!(
            "Session {} registered as '{}'",
            session.id,
            session.display_name
        );
        state.sessions.insert(session.id, session);
        let count = state.sessions.len();
        state.metrics.set_total_users(count);
        count
    }

    async fn remove(&self, id: SessionId) -> Option<Session> {
        let mut state = self.state.lock().await;
        let removed = state.sessions.remove(&id);
        if removed.is_some() {
            let count = state.sessions.len();
            state.metrics.set_total_users(count);
            tracing::debug!("Session {} unregistered", id);
        }
        removed
    }

    async fn broadcast(&self, payload: &[u8], exclude: Option<SessionId>) -> usize {
        let state = self.state.lock().await;
        let mut delivered = 0;

        for session in state.sessions.values() {
            if Some(session.id) == exclude {
                continue;
            }
            // Broadcast tolerates individual failures
            if let Err(e) = session.outbound.send(payload.to_vec()) {
                tracing::warn!(
                    "Failed to queue message for session {} ('{}'): {}",
                    session.id,
                    session.display_name,
                    e
                );
            } else {
                delivered += 1;
            }
        }

        delivered
    }

    async fn snapshot(&self) -> Vec<DisplayName> {
        let state = self.state.lock().await;
        state
            .sessions
            .values()
            .map(|s| s.display_name.clone())
            .collect()
    }

    async fn count(&self) -> usize {
        let state = self.state.lock().await;
        state.sessions.len()
    }

    async fn record_message(&self, now: Timestamp) {
        let mut state = self.state.lock().await;
        state.metrics.record_message(now);
    }

    async fn stats_snapshot(&self) -> StatsSnapshot {
        let state = self.state.lock().await;
        StatsSnapshot {
            metrics: state.metrics.clone(),
            users: state
                .sessions
                .values()
                .map(|s| s.display_name.clone())
                .collect(),
        }
    }
}
