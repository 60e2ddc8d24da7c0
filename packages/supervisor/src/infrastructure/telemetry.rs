//! UDP telemetry collector.
//!
//! Binds the well-known monitor port and logs every record of every datagram.
//! One datagram is a batch of zero or more records.

use std::net::SocketAddr;

use charla_shared::telemetry::{MAX_DATAGRAM_SIZE, decode_records};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::domain::{CollectorError, TelemetryBatch};

#[derive(Debug)]
pub struct UdpTelemetryCollector {
    socket: UdpSocket,
}

impl UdpTelemetryCollector {
    pub async fn bind(addr: SocketAddr) -> Result<Self, CollectorError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| CollectorError::Bind { addr, source })?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, CollectorError> {
        self.socket.local_addr().map_err(CollectorError::LocalAddr)
    }

    /// Wait for one datagram and decode it.
    pub async fn recv_batch(&self, buf: &mut [u8]) -> Result<TelemetryBatch, CollectorError> {
        let (len, from) = self
            .socket
            .recv_from(buf)
            .await
            .map_err(CollectorError::Receive)?;

        Ok(TelemetryBatch {
            from,
            records: decode_records(&buf[..len]),
        })
    }

    /// Receive and log datagrams until `shutdown` fires.
    ///
    /// Receive errors are logged and the loop continues.
    pub async fn run(self, shutdown: CancellationToken) {
        match self.socket.local_addr() {
            Ok(addr) => tracing::info!("Telemetry collector listening on {}", addr),
            Err(e) => tracing::warn!("Telemetry collector address unknown: {}", e),
        }

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.recv_batch(&mut buf) => received,
            };

            match received {
                Ok(batch) => {
                    for record in &batch.records {
                        tracing::info!(from = %batch.from, "Telemetry received: {}", record);
                    }
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }

        tracing::info!("Telemetry collector stopped");
    }
}
