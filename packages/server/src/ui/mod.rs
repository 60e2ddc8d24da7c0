//! TCP chat server implementation.

mod config;
mod error;
mod handler;
mod server;
pub mod state;

pub use config::ChatServerConfig;
pub use error::{ServerError, SessionError};
pub use server::ChatServer;
