//! Chat server configuration.

use std::{net::SocketAddr, time::Duration};

use charla_shared::telemetry::default_monitor_addr;

/// Default interval between two telemetry reports.
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Largest payload taken from one socket read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Settings of one chat server instance.
#[derive(Debug, Clone)]
pub struct ChatServerConfig {
    /// Address to bind to (e.g., "0.0.0.0")
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Where telemetry datagrams are sent
    pub monitor_addr: SocketAddr,
    pub stats_interval: Duration,
    pub read_buffer_size: usize,
}

impl ChatServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            monitor_addr: default_monitor_addr(),
            stats_interval: DEFAULT_STATS_INTERVAL,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}
