//! Session entity and the value objects it is built from.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use tokio::sync::mpsc;

/// Channel used to queue outbound bytes for one connection.
///
/// The connection's writer task drains it into the socket, so enqueuing never blocks.
pub type OutboundChannel = mpsc::UnboundedSender<Vec<u8>>;

/// Stable identifier of an accepted connection.
///
/// Ids are handed out in increasing order, so ordering by id is connection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing [`SessionId`]s.
#[derive(Debug)]
pub struct SessionIdFactory {
    next: AtomicU64,
}

impl SessionIdFactory {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn generate(&self) -> SessionId {
        SessionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionIdFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Name a participant chose when connecting.
///
/// Kept as the bytes the client sent; it is only decoded (lossily) for logs and
/// telemetry. Neither uniqueness nor non-emptiness is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(Vec<u8>);

impl DisplayName {
    /// Build a display name from the first payload a client sent.
    ///
    /// Surrounding ASCII whitespace (including the line terminator) is stripped.
    pub fn from_payload(payload: &[u8]) -> Self {
        Self(payload.trim_ascii().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// A connected participant as held by the registry.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub display_name: DisplayName,
    pub joined_at: Timestamp,
    /// Outbound queue of the connection (the connection handle)
    pub outbound: OutboundChannel,
}

impl Session {
    pub fn new(
        id: SessionId,
        display_name: DisplayName,
        joined_at: Timestamp,
        outbound: OutboundChannel,
    ) -> Self {
        Self {
            id,
            display_name,
            joined_at,
            outbound,
        }
    }
}
