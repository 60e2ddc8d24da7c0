//! UDP telemetry reporter.
//!
//! Each publish opens a fresh datagram socket, sends one datagram and drops the
//! socket. Loss is tolerated; nothing is retried.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use charla_shared::telemetry::encode_records;
use tokio::net::UdpSocket;

use crate::domain::{TelemetryError, TelemetrySink};

/// [`TelemetrySink`] sending datagrams to a fixed monitor address.
#[derive(Debug, Clone)]
pub struct UdpTelemetryReporter {
    destination: SocketAddr,
}

impl UdpTelemetryReporter {
    pub fn new(destination: SocketAddr) -> Self {
        Self { destination }
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    fn local_bind_addr(&self) -> SocketAddr {
        match self.destination {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        }
    }
}

#[async_trait]
impl TelemetrySink for UdpTelemetryReporter {
    async fn publish(&self, records: Vec<String>) -> Result<(), TelemetryError> {
        let socket = UdpSocket::bind(self.local_bind_addr())
            .await
            .map_err(TelemetryError::Bind)?;

        let payload = encode_records(&records);
        socket
            .send_to(&payload, self.destination)
            .await
            .map_err(|source| TelemetryError::Send {
                addr: self.destination,
                source,
            })?;

        tracing::debug!(
            "Sent {} telemetry records ({} bytes) to {}",
            records.len(),
            payload.len(),
            self.destination
        );
        Ok(())
    }
}
