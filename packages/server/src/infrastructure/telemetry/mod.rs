//! Telemetry sink implementations.

pub mod udp;

pub use udp::UdpTelemetryReporter;
