//! Per-connection session handling.
//!
//! A session moves through `AwaitingName -> Active -> Closed`. Payloads are raw
//! bytes: one read is one payload, with no framing or decoding. Everything written
//! to the client goes through one outbound channel drained by a writer task, so
//! replies and broadcasts reach the socket in the order they were queued.

use std::{net::SocketAddr, sync::Arc};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{DisplayName, NAME_PROMPT, SessionId},
    ui::{error::SessionError, state::AppState},
    usecase::MessageOutcome,
};

#[derive(Debug)]
enum SessionPhase {
    AwaitingName,
    Active(DisplayName),
    Closed { joined: bool },
}

/// Drive one accepted connection until it closes.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    id: SessionId,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) {
    let (mut reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let send_task = pusher_loop(rx, writer, id, shutdown.clone());

    // The writer task holds the receiver, so this only fails if it already died.
    let _ = tx.send(NAME_PROMPT.as_bytes().to_vec());

    let mut buffer = vec![0u8; state.read_buffer_size];
    let mut phase = SessionPhase::AwaitingName;

    loop {
        phase = match phase {
            SessionPhase::AwaitingName => {
                match read_payload(&mut reader, &mut buffer, id, &shutdown).await {
                    Some(payload) => {
                        let name = DisplayName::from_payload(&payload);
                        let joined_at = state
                            .join_chat_usecase
                            .execute(id, name.clone(), tx.clone())
                            .await;
                        tracing::info!(
                            "Session {} from {} joined as '{}' at {}",
                            id,
                            peer,
                            name,
                            charla_shared::time::timestamp_to_rfc3339(joined_at.value())
                        );
                        SessionPhase::Active(name)
                    }
                    None => SessionPhase::Closed { joined: false },
                }
            }
            SessionPhase::Active(name) => {
                match read_payload(&mut reader, &mut buffer, id, &shutdown).await {
                    Some(payload) => {
                        match state
                            .handle_message_usecase
                            .execute(id, &name, &payload)
                            .await
                        {
                            MessageOutcome::Reply(reply) => {
                                if tx.send(reply).is_err() {
                                    tracing::debug!("Session {} writer is gone", id);
                                    SessionPhase::Closed { joined: true }
                                } else {
                                    SessionPhase::Active(name)
                                }
                            }
                            MessageOutcome::Broadcast(_) => SessionPhase::Active(name),
                            MessageOutcome::Quit => {
                                tracing::info!("Session {} ('{}') requested to leave", id, name);
                                SessionPhase::Closed { joined: true }
                            }
                        }
                    }
                    None => SessionPhase::Closed { joined: true },
                }
            }
            SessionPhase::Closed { joined } => {
                if joined && let Some(session) = state.leave_chat_usecase.execute(id).await {
                    tracing::info!("Session {} ('{}') left the chat", id, session.display_name);
                }
                break;
            }
        };
    }

    // Registry clone is gone after leaving; dropping ours lets the writer flush and close.
    drop(tx);
    if let Err(e) = send_task.await {
        tracing::warn!("Writer task of session {} failed: {}", id, e);
    }
    tracing::debug!("Session {} from {} closed", id, peer);
}

/// Read the next payload. `None` means the connection is over (EOF, error, shutdown).
async fn read_payload(
    reader: &mut OwnedReadHalf,
    buffer: &mut [u8],
    id: SessionId,
    shutdown: &CancellationToken,
) -> Option<Vec<u8>> {
    let read = tokio::select! {
        _ = shutdown.cancelled() => {
            tracing::debug!("Session {} interrupted by shutdown", id);
            return None;
        }
        read = reader.read(buffer) => read.map_err(SessionError::Read),
    };

    match read {
        Ok(0) => {
            tracing::debug!("Session {} reached end of stream", id);
            None
        }
        Ok(n) => Some(buffer[..n].to_vec()),
        Err(e) => {
            tracing::warn!("Session {}: {}", id, e);
            None
        }
    }
}

/// Spawns a task that drains the outbound channel into the socket.
///
/// The task ends when every sender is dropped, a write fails or `shutdown` fires,
/// then shuts down the write half of the connection. A write to a peer that stopped
/// reading is abandoned on shutdown.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<Vec<u8>>,
    mut writer: OwnedWriteHalf,
    id: SessionId,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let written = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Session {} writer interrupted by shutdown", id);
                    break;
                }
                written = writer.write_all(&msg) => written.map_err(SessionError::Write),
            };
            if let Err(e) = written {
                tracing::warn!("Session {}: {}", id, e);
                break;
            }
        }
        let _ = writer.shutdown().await;
    })
}
