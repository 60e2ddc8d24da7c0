//! TCP chat server with an in-band command protocol.
//!
//! Clients receive a name prompt, then every payload they send (one read of up to
//! 1024 bytes, no line framing) is either a command (`@usuarios`, `@conexion`,
//! `@salir`, `@h`) or a chat message relayed byte for byte to everyone else.
//! Statistics are pushed to the supervisor over UDP.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin charla-server -- serve --port 5000
//! cargo run --bin charla-server -- serve --host 127.0.0.1 --port 5000 --monitor-addr 127.0.0.1:55555
//! ```

use std::{net::SocketAddr, sync::Arc, time::Duration};

use charla_server::{
    infrastructure::{registry::InMemoryUserRegistry, telemetry::UdpTelemetryReporter},
    ui::{ChatServer, ChatServerConfig},
    usecase::{HandleMessageUseCase, JoinChatUseCase, LeaveChatUseCase, ReportStatsUseCase},
};
use charla_shared::{
    logger::setup_logger,
    signal::shutdown_signal,
    telemetry::DEFAULT_MONITOR_PORT,
    time::{Clock, SystemClock},
};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "charla-server")]
#[command(about = "TCP chat server with broadcast and telemetry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run a chat server instance
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long)]
    port: u16,

    /// Address of the telemetry collector
    #[arg(long, default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_MONITOR_PORT)))]
    monitor_addr: SocketAddr,

    /// Seconds between two statistics reports
    #[arg(long, default_value = "5")]
    stats_interval_secs: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let Cli {
        mode: Mode::Serve(args),
    } = Cli::parse();

    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ChatServerConfig {
        monitor_addr: args.monitor_addr,
        stats_interval: Duration::from_secs(args.stats_interval_secs.max(1)),
        ..ChatServerConfig::new(args.host, args.port)
    };

    // Initialize dependencies in order:
    // 1. Registry and clock
    // 2. Telemetry sink
    // 3. UseCases
    // 4. Server

    let registry = Arc::new(InMemoryUserRegistry::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let reporter = Arc::new(UdpTelemetryReporter::new(config.monitor_addr));
    tracing::info!("Publishing statistics to {}", reporter.destination());

    let join_chat_usecase = Arc::new(JoinChatUseCase::new(registry.clone(), clock.clone()));
    let leave_chat_usecase = Arc::new(LeaveChatUseCase::new(registry.clone()));
    let handle_message_usecase = Arc::new(HandleMessageUseCase::new(registry.clone(), clock));
    let report_stats_usecase = Arc::new(ReportStatsUseCase::new(
        registry,
        reporter,
        config.port,
    ));

    let server = ChatServer::new(
        config,
        join_chat_usecase,
        leave_chat_usecase,
        handle_message_usecase,
        report_stats_usecase,
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    if let Err(e) = server.run(shutdown).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
