//! Infrastructure layer: concrete implementations of the domain interfaces.

pub mod registry;
pub mod telemetry;
