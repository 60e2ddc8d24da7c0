//! UseCase layer: chat operations orchestrated over the domain interfaces.

mod handle_message;
mod join_chat;
mod leave_chat;
mod report_stats;

pub use handle_message::{HandleMessageUseCase, MessageOutcome};
pub use join_chat::JoinChatUseCase;
pub use leave_chat::LeaveChatUseCase;
pub use report_stats::ReportStatsUseCase;
