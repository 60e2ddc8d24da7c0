//! UseCase layer: the supervision and monitoring loops.

mod monitor_fleet;
mod supervise_instance;

pub use monitor_fleet::FleetMonitor;
pub use supervise_instance::{InstanceSupervisor, SupervisionStep};
