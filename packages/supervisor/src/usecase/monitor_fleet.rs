//! UseCase: periodically turn failed instances back on.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::domain::{FleetState, InstanceId};

pub struct FleetMonitor {
    fleet: Arc<FleetState>,
    interval: Duration,
}

impl FleetMonitor {
    pub fn new(fleet: Arc<FleetState>, interval: Duration) -> Self {
        Self { fleet, interval }
    }

    /// Set every cleared activation flag, returning the revived instances.
    pub fn revive_inactive(&self) -> Vec<InstanceId> {
        self.fleet
            .instances()
            .iter()
            .filter(|instance| instance.flag.activate())
            .map(|instance| {
                tracing::info!(
                    "Restarting instance {} (port {}, {} failures so far)",
                    instance.id,
                    instance.port,
                    instance.failures()
                );
                instance.id
            })
            .collect()
    }

    /// Sweep, then sleep `interval`, until `shutdown` fires.
    pub async fn run(self, shutdown: CancellationToken) {
        loop {
            self.revive_inactive();

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::debug!("Fleet monitor stopped");
    }
}
