//! Telemetry wire format shared by the reporter (chat server) and the collector (supervisor).
//!
//! A datagram is a batch of zero or more human-readable records joined by `\n`.
//! There is no schema, no sequencing and no acknowledgment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Well-known UDP port the supervisor listens on for telemetry.
pub const DEFAULT_MONITOR_PORT: u16 = 55555;

/// Largest payload the collector reads from one datagram.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Default destination for telemetry datagrams.
pub fn default_monitor_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_MONITOR_PORT)
}

/// Join records into a single datagram payload.
pub fn encode_records<S: AsRef<str>>(records: &[S]) -> Vec<u8> {
    records
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes()
}

/// Split a datagram payload into its non-empty records.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn decode_records(payload: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(payload)
        .split('\n')
        .filter(|record| !record.is_empty())
        .map(str::to_string)
        .collect()
}
