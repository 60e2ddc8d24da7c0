//! UseCase: a named connection joins the chat.

use std::sync::Arc;

use charla_shared::time::Clock;

use crate::domain::{
    DisplayName, OutboundChannel, Session, SessionId, Timestamp, UserRegistry, join_notice,
};

/// Registers a session and announces it to everyone else.
pub struct JoinChatUseCase {
    registry: Arc<dyn UserRegistry>,
    clock: Arc<dyn Clock>,
}

impl JoinChatUseCase {
    pub fn new(registry: Arc<dyn UserRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Execute the join.
    ///
    /// # Returns
    ///
    /// The time the session joined.
    pub async fn execute(
        &self,
        id: SessionId,
        display_name: DisplayName,
        outbound: OutboundChannel,
    ) -> Timestamp {
        let joined_at = Timestamp::new(self.clock.now_millis());
        let notice = join_notice(display_name.as_bytes());

        let count = self
            .registry
            .add(Session::new(id, display_name, joined_at, outbound))
            .await;
        let notified = self.registry.broadcast(&notice, Some(id)).await;

        tracing::debug!(
            "Session {} joined ({} connected, {} notified)",
            id,
            count,
            notified
        );
        joined_at
    }
}
