//! UseCase: one inbound payload from an active session.

use std::sync::Arc;

use charla_shared::time::Clock;

use crate::domain::{
    Command, DisplayName, HELP_TEXT, SessionId, Timestamp, UserRegistry, chat_line,
    connection_info, user_list,
};

/// What the connection handler has to do after a payload was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Send these bytes back to the sender only
    Reply(Vec<u8>),
    /// The payload was relayed to this many peers
    Broadcast(usize),
    /// The sender asked to leave
    Quit,
}

/// Records statistics for a payload and dispatches it as a command.
pub struct HandleMessageUseCase {
    registry: Arc<dyn UserRegistry>,
    clock: Arc<dyn Clock>,
}

impl HandleMessageUseCase {
    pub fn new(registry: Arc<dyn UserRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    pub async fn execute(
        &self,
        sender: SessionId,
        sender_name: &DisplayName,
        payload: &[u8],
    ) -> MessageOutcome {
        self.registry
            .record_message(Timestamp::new(self.clock.now_millis()))
            .await;

        match Command::parse(payload) {
            Command::List => {
                let names = self.registry.snapshot().await;
                let names: Vec<&[u8]> = names.iter().map(DisplayName::as_bytes).collect();
                MessageOutcome::Reply(user_list(&names))
            }
            Command::ConnectionInfo => {
                MessageOutcome::Reply(connection_info(self.registry.count().await))
            }
            Command::Quit => MessageOutcome::Quit,
            Command::Help => MessageOutcome::Reply(HELP_TEXT.as_bytes().to_vec()),
            Command::Chat(text) => {
                let line = chat_line(sender_name.as_bytes(), &text);
                let delivered = self.registry.broadcast(&line, Some(sender)).await;
                tracing::debug!("Session {} broadcast to {} peers", sender, delivered);
                MessageOutcome::Broadcast(delivered)
            }
        }
    }
}
