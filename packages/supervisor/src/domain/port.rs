//! Port availability interface.

use async_trait::async_trait;

/// Answers whether an instance could bind its port right now.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortProbe: Send + Sync {
    async fn is_available(&self, port: u16) -> bool;
}
