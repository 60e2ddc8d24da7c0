//! Domain layer: fleet state and the process and port interfaces.

mod error;
mod instance;
mod port;
mod process;
mod telemetry;

pub use error::{CollectorError, ConfigError, ProcessError, SupervisorError};
pub use instance::{ActivationFlag, FleetState, InstanceDescriptor, InstanceId};
pub use port::PortProbe;
pub use process::{ExitOutcome, LaunchSpec, ProcessHandle, ProcessLauncher};
pub use telemetry::TelemetryBatch;

#[cfg(test)]
pub use port::MockPortProbe;
