//! Supervisor execution logic.

use std::sync::Arc;

use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    config::SupervisorConfig,
    domain::{FleetState, PortProbe, ProcessLauncher, SupervisorError},
    infrastructure::UdpTelemetryCollector,
    usecase::{FleetMonitor, InstanceSupervisor},
};

/// Run the supervisor until `shutdown` fires
///
/// Starts one supervision loop per configured port, the fleet monitor and the
/// telemetry collector, then waits for all of them to stop.
///
/// # Errors
///
/// Returns [`SupervisorError::Config`] when the configuration is invalid. A
/// telemetry port that cannot be bound is logged and the fleet runs without it.
pub async fn run_supervisor(
    config: SupervisorConfig,
    launcher: Arc<dyn ProcessLauncher>,
    probe: Arc<dyn PortProbe>,
    shutdown: CancellationToken,
) -> Result<(), SupervisorError> {
    config.validate()?;

    let fleet = Arc::new(FleetState::new(&config.ports));
    let tracker = TaskTracker::new();

    match UdpTelemetryCollector::bind(config.collector_bind_addr()).await {
        Ok(collector) => {
            tracker.spawn(collector.run(shutdown.child_token()));
        }
        Err(e) => tracing::error!("{}. Continuing without telemetry", e),
    }

    for instance in fleet.instances() {
        let supervisor = InstanceSupervisor::new(
            instance.clone(),
            config.launch_spec(instance.port),
            launcher.clone(),
            probe.clone(),
            config.timings.clone(),
        );
        tracker.spawn(supervisor.run(shutdown.child_token()));
    }

    let monitor = FleetMonitor::new(fleet.clone(), config.monitor_interval);
    tracker.spawn(monitor.run(shutdown.child_token()));

    tracing::info!(
        "Supervising {} instance(s) of {}",
        fleet.len(),
        config.server_bin.display()
    );
    tracing::info!("Press Ctrl+C to shutdown gracefully");

    tracker.close();
    tracker.wait().await;

    tracing::info!("Supervisor shutdown complete");

    Ok(())
}
