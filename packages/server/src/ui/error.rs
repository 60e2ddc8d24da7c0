//! Error types for the chat server.

use thiserror::Error;

/// Errors that stop a chat server instance.
///
/// Failures of a single connection never surface here; they only close that session.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound (port in use, permission denied)
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The bound socket could not report its address
    #[error("Failed to read listener address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// I/O failures of one connection. They end that session only.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Read error: {0}")]
    Read(#[source] std::io::Error),

    #[error("Write error: {0}")]
    Write(#[source] std::io::Error),
}
