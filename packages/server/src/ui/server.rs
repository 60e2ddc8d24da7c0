//! Server execution logic.

use std::{sync::Arc, time::Duration};

use tokio::{net::TcpListener, time::MissedTickBehavior};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    domain::SessionIdFactory,
    usecase::{HandleMessageUseCase, JoinChatUseCase, LeaveChatUseCase, ReportStatsUseCase},
};

use super::{
    config::ChatServerConfig, error::ServerError, handler::handle_connection, state::AppState,
};

/// TCP chat server
///
/// Owns the listening socket, spawns one task per accepted connection and runs
/// the periodic statistics report.
///
/// # Example
///
/// ```ignore
/// let server = ChatServer::new(
///     config,
///     join_chat_usecase,
///     leave_chat_usecase,
///     handle_message_usecase,
///     report_stats_usecase,
/// );
/// server.run(shutdown).await?;
/// ```
pub struct ChatServer {
    config: ChatServerConfig,
    join_chat_usecase: Arc<JoinChatUseCase>,
    leave_chat_usecase: Arc<LeaveChatUseCase>,
    handle_message_usecase: Arc<HandleMessageUseCase>,
    report_stats_usecase: Arc<ReportStatsUseCase>,
    session_ids: SessionIdFactory,
}

impl ChatServer {
    pub fn new(
        config: ChatServerConfig,
        join_chat_usecase: Arc<JoinChatUseCase>,
        leave_chat_usecase: Arc<LeaveChatUseCase>,
        handle_message_usecase: Arc<HandleMessageUseCase>,
        report_stats_usecase: Arc<ReportStatsUseCase>,
    ) -> Self {
        Self {
            config,
            join_chat_usecase,
            leave_chat_usecase,
            handle_message_usecase,
            report_stats_usecase,
            session_ids: SessionIdFactory::new(),
        }
    }

    /// Bind to the configured address and serve until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the listening socket cannot be bound. The
    /// server never retries on its own.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` fires.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        tracing::info!(
            "Chat server listening on {}. Waiting for connections...",
            local_addr
        );

        let state = Arc::new(AppState {
            join_chat_usecase: self.join_chat_usecase,
            leave_chat_usecase: self.leave_chat_usecase,
            handle_message_usecase: self.handle_message_usecase,
            read_buffer_size: self.config.read_buffer_size,
        });

        let stats_task = stats_loop(
            self.report_stats_usecase,
            self.config.stats_interval,
            shutdown.clone(),
        );

        let sessions = TaskTracker::new();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let id = self.session_ids.generate();
                        tracing::debug!("Accepted connection {} from {}", id, peer);
                        sessions.spawn(handle_connection(
                            stream,
                            peer,
                            id,
                            state.clone(),
                            shutdown.child_token(),
                        ));
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                    }
                },
            }
        }

        drop(listener);
        sessions.close();
        sessions.wait().await;
        if let Err(e) = stats_task.await {
            tracing::warn!("Statistics task failed: {}", e);
        }

        tracing::info!("Chat server on {} shut down", local_addr);
        Ok(())
    }
}

/// Spawns the task publishing statistics every `interval` until `shutdown` fires.
fn stats_loop(
    report_stats_usecase: Arc<ReportStatsUseCase>,
    interval: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the first report is one interval in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = report_stats_usecase.execute().await {
                        tracing::warn!("Failed to publish statistics: {}", e);
                    }
                }
            }
        }
    })
}
