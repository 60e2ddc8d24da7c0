//! Port probing by trial bind.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use tokio::net::TcpListener;

use crate::domain::PortProbe;

/// Binds the port on all interfaces and releases it immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpPortProbe;

#[async_trait]
impl PortProbe for TcpPortProbe {
    async fn is_available(&self, port: u16) -> bool {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                drop(listener);
                true
            }
            Err(e) => {
                tracing::debug!("Port {} is not bindable: {}", port, e);
                false
            }
        }
    }
}
