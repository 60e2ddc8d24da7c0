//! Registry trait definition.
//!
//! The chat use cases depend on this interface; the in-memory implementation lives
//! in the infrastructure layer.

use async_trait::async_trait;

use super::{DisplayName, Session, SessionId, StatsSnapshot, Timestamp};

/// Shared collection of connected sessions and the metrics derived from them.
///
/// Every operation is atomic with respect to the others: implementations guard
/// sessions and metrics with a single exclusive lock.
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Register a session, returning the number of connected sessions afterwards.
    async fn add(&self, session: Session) -> usize;

    /// Remove a session. Unknown ids are a no-op and return `None`.
    async fn remove(&self, id: SessionId) -> Option<Session>;

    /// Queue `payload` for every session except `exclude`.
    ///
    /// A failed delivery to one peer is logged and skipped. Returns the number of
    /// sessions the payload was queued for.
    async fn broadcast(&self, payload: &[u8], exclude: Option<SessionId>) -> usize;

    /// Display names in connection order.
    async fn snapshot(&self) -> Vec<DisplayName>;

    /// Number of connected sessions.
    async fn count(&self) -> usize;

    /// Feed one inbound payload into the metrics.
    async fn record_message(&self, now: Timestamp);

    /// Metrics and names captured under the registry lock.
    async fn stats_snapshot(&self) -> StatsSnapshot;
}
