//! Server state shared by every connection task.

use std::sync::Arc;

use crate::usecase::{HandleMessageUseCase, JoinChatUseCase, LeaveChatUseCase};

/// Shared application state
pub struct AppState {
    pub join_chat_usecase: Arc<JoinChatUseCase>,
    pub leave_chat_usecase: Arc<LeaveChatUseCase>,
    pub handle_message_usecase: Arc<HandleMessageUseCase>,
    /// Size of the per-connection read buffer
    pub read_buffer_size: usize,
}
