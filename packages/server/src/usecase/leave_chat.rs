//! UseCase: a session leaves the chat.

use std::sync::Arc;

use crate::domain::{Session, SessionId, UserRegistry, leave_notice};

/// Removes a session and announces the departure to the remaining peers.
pub struct LeaveChatUseCase {
    registry: Arc<dyn UserRegistry>,
}

impl LeaveChatUseCase {
    pub fn new(registry: Arc<dyn UserRegistry>) -> Self {
        Self { registry }
    }

    /// Execute the leave.
    ///
    /// The notice is only broadcast when the session was actually registered, so
    /// calling this twice for the same id announces the departure once.
    pub async fn execute(&self, id: SessionId) -> Option<Session> {
        let removed = self.registry.remove(id).await?;

        let notice = leave_notice(removed.display_name.as_bytes());
        let notified = self.registry.broadcast(&notice, Some(id)).await;
        tracing::debug!("Session {} left ({} notified)", id, notified);

        Some(removed)
    }
}
