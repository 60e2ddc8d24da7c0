//! Domain layer: entities, value objects and the interfaces the use cases depend on.

mod command;
mod error;
mod message;
mod metrics;
mod registry;
mod session;
mod telemetry;

pub use command::Command;
pub use error::TelemetryError;
pub use message::{
    HELP_TEXT, NAME_PROMPT, chat_line, connection_info, join_notice, leave_notice, user_list,
};
pub use metrics::{ServerMetrics, StatsSnapshot};
pub use registry::UserRegistry;
pub use session::{
    DisplayName, OutboundChannel, Session, SessionId, SessionIdFactory, Timestamp,
};
pub use telemetry::TelemetrySink;

#[cfg(test)]
pub use telemetry::MockTelemetrySink;
