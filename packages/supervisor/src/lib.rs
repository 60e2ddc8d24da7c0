//! Supervisor for a fleet of chat server instances.
//!
//! Each instance gets a supervision loop that launches the chat server binary on
//! its port and clears the instance's activation flag when the process fails.
//! A fleet monitor turns cleared flags back on at a fixed cadence, and a UDP
//! collector logs the telemetry the instances publish.

// layers
pub mod domain;
pub mod infrastructure;
pub mod usecase;

pub mod config;
pub mod runner;
