//! TCP chat server library.
//!
//! This library provides the chat broadcast engine: a shared user registry,
//! per-connection sessions speaking a small in-band command protocol, and a
//! periodic statistics task that publishes UDP telemetry.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
