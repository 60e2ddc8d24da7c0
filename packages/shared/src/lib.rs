//! Code shared between the Charla chat server and its supervisor.

pub mod logger;
pub mod signal;
pub mod telemetry;
pub mod time;
