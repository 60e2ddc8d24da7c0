//! Infrastructure layer: OS-backed implementations of the domain interfaces.

pub mod port;
pub mod process;
pub mod telemetry;

pub use port::TcpPortProbe;
pub use process::{TokioProcessHandle, TokioProcessLauncher};
pub use telemetry::UdpTelemetryCollector;
