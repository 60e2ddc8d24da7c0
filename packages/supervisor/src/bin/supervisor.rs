//! Supervisor for a fleet of chat server instances.
//!
//! Launches one `charla-server` per port, relaunches instances that fail and
//! logs the statistics they publish over UDP.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin charla-supervisor -- 5000 5001 5002
//! cargo run --bin charla-supervisor -- 5000 --server-bin ./target/debug/charla-server --telemetry-port 55555
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use charla_shared::{
    logger::setup_logger, signal::shutdown_signal, telemetry::DEFAULT_MONITOR_PORT,
};
use charla_supervisor::{
    config::{DEFAULT_SERVER_BIN, SupervisorConfig},
    infrastructure::{TcpPortProbe, TokioProcessLauncher},
    runner::run_supervisor,
};
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "charla-supervisor")]
#[command(about = "Launch, restart and monitor chat server instances", long_about = None)]
struct Args {
    /// Ports to run chat server instances on, one instance per port
    #[arg(required = true)]
    ports: Vec<u16>,

    /// Path to the chat server binary
    #[arg(long, default_value = DEFAULT_SERVER_BIN)]
    server_bin: PathBuf,

    /// UDP port the telemetry collector listens on
    #[arg(long, default_value_t = DEFAULT_MONITOR_PORT)]
    telemetry_port: u16,

    /// Seconds between two restart sweeps
    #[arg(long, default_value = "5")]
    monitor_interval_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = SupervisorConfig {
        telemetry_port: args.telemetry_port,
        monitor_interval: Duration::from_secs(args.monitor_interval_secs.max(1)),
        ..SupervisorConfig::new(args.server_bin, args.ports)
    };

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    if let Err(e) = run_supervisor(
        config,
        Arc::new(TokioProcessLauncher),
        Arc::new(TcpPortProbe),
        shutdown,
    )
    .await
    {
        tracing::error!("Supervisor error: {}", e);
        std::process::exit(1);
    }
}
