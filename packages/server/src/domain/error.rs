//! Domain-level error types.

use std::net::SocketAddr;

use thiserror::Error;

/// Telemetry delivery errors. Callers log these and move on.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Could not open the datagram socket
    #[error("Failed to open telemetry socket: {0}")]
    Bind(#[source] std::io::Error),

    /// The datagram could not be sent
    #[error("Failed to send telemetry to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
