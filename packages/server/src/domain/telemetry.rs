//! Outbound telemetry interface.

use async_trait::async_trait;

use super::TelemetryError;

/// Best-effort destination for status records.
///
/// Implementations send once and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn publish(&self, records: Vec<String>) -> Result<(), TelemetryError>;
}
