//! Telemetry received from instances.

use std::net::SocketAddr;

/// Records decoded from one datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryBatch {
    pub from: SocketAddr,
    pub records: Vec<String>,
}
