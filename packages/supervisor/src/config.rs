//! Supervisor configuration.

use std::{
    collections::HashSet,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use charla_shared::telemetry::DEFAULT_MONITOR_PORT;

use crate::domain::{ConfigError, LaunchSpec};

/// Default location of the chat server binary.
pub const DEFAULT_SERVER_BIN: &str = "./target/release/charla-server";

/// Delays of one supervision loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorTimings {
    /// Sleep while the instance is inactive or after a clean exit
    pub poll_interval: Duration,
    /// Sleep after finding the port taken
    pub port_busy_delay: Duration,
    /// Sleep after the instance failed
    pub failure_cooldown: Duration,
}

impl Default for SupervisorTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            port_busy_delay: Duration::from_secs(5),
            failure_cooldown: Duration::from_secs(5),
        }
    }
}

/// Settings of the whole supervisor process.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Chat server binary launched for every instance
    pub server_bin: PathBuf,
    /// One instance per port
    pub ports: Vec<u16>,
    /// UDP port the telemetry collector binds on all interfaces
    pub telemetry_port: u16,
    /// Cadence of the fleet monitor
    pub monitor_interval: Duration,
    pub timings: SupervisorTimings,
}

impl SupervisorConfig {
    pub fn new(server_bin: impl Into<PathBuf>, ports: Vec<u16>) -> Self {
        Self {
            server_bin: server_bin.into(),
            ports,
            telemetry_port: DEFAULT_MONITOR_PORT,
            monitor_interval: Duration::from_secs(5),
            timings: SupervisorTimings::default(),
        }
    }

    /// Check the configuration before any loop starts.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when no port is given, a port is listed twice or
    /// is 0, or the server binary does not exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ports.is_empty() {
            return Err(ConfigError::NoPorts);
        }

        let mut seen = HashSet::new();
        for &port in &self.ports {
            if port == 0 {
                return Err(ConfigError::EphemeralPort);
            }
            if !seen.insert(port) {
                return Err(ConfigError::DuplicatePort(port));
            }
        }

        if !self.server_bin.is_file() {
            return Err(ConfigError::ServerBinaryMissing(self.server_bin.clone()));
        }

        Ok(())
    }

    /// Address the telemetry collector binds to.
    pub fn collector_bind_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.telemetry_port)
    }

    /// Address instances send telemetry to.
    pub fn instance_monitor_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), self.telemetry_port)
    }

    /// Command line of the instance serving `port`.
    pub fn launch_spec(&self, port: u16) -> LaunchSpec {
        LaunchSpec {
            program: self.server_bin.clone(),
            args: vec![
                "serve".to_string(),
                "--port".to_string(),
                port.to_string(),
                "--monitor-addr".to_string(),
                self.instance_monitor_addr().to_string(),
            ],
        }
    }
}
