//! UseCase: publish aggregate statistics as telemetry.

use std::sync::Arc;

use crate::domain::{StatsSnapshot, TelemetryError, TelemetrySink, UserRegistry};

/// Snapshots the registry metrics and hands them to the telemetry sink.
pub struct ReportStatsUseCase {
    registry: Arc<dyn UserRegistry>,
    sink: Arc<dyn TelemetrySink>,
    /// Port of this server instance, used to tell instances apart at the collector
    port: u16,
}

impl ReportStatsUseCase {
    pub fn new(registry: Arc<dyn UserRegistry>, sink: Arc<dyn TelemetrySink>, port: u16) -> Self {
        Self {
            registry,
            sink,
            port,
        }
    }

    /// Take one snapshot and publish it.
    ///
    /// The registry lock is released before any network I/O.
    pub async fn execute(&self) -> Result<(), TelemetryError> {
        let snapshot = self.registry.stats_snapshot().await;
        self.sink.publish(format_stats(self.port, &snapshot)).await
    }
}

/// Render a snapshot as telemetry records.
pub fn format_stats(port: u16, snapshot: &StatsSnapshot) -> Vec<String> {
    let users: Vec<String> = snapshot.users.iter().map(ToString::to_string).collect();

    let mut records = vec![
        format!("server_port: {}", port),
        format!("connected_users: [{}]", users.join(", ")),
    ];
    records.extend(snapshot.metrics.to_records());
    records
}
