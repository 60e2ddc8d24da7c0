//! Error types for the supervisor.

use std::{net::SocketAddr, path::PathBuf};

use thiserror::Error;

/// Process lifecycle errors
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Failed to kill process: {0}")]
    Kill(#[source] std::io::Error),
}

/// Telemetry collector errors. The supervisor keeps running without telemetry.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Failed to bind telemetry socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to receive telemetry: {0}")]
    Receive(#[source] std::io::Error),

    #[error("Failed to read collector address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// Invalid supervisor configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("At least one port is required")]
    NoPorts,

    #[error("Port {0} is listed more than once")]
    DuplicatePort(u16),

    #[error("Port 0 cannot be supervised")]
    EphemeralPort,

    #[error("Server binary '{}' does not exist or is not accessible", .0.display())]
    ServerBinaryMissing(PathBuf),
}

/// Errors that prevent the supervisor from starting
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}
