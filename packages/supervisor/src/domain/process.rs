//! Process-handle abstraction.
//!
//! The supervision loop only sees these traits, so its retry logic is independent
//! of how a process is actually started.

use std::{fmt, path::PathBuf};

use async_trait::async_trait;

use super::ProcessError;

/// Program and arguments of one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a launched process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exit status 0
    Success,
    /// Any other status; `code` is `None` when the process was killed by a signal
    Failure { code: Option<i32> },
}

impl ExitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => write!(f, "exit code 0"),
            ExitOutcome::Failure { code: Some(code) } => write!(f, "exit code {}", code),
            ExitOutcome::Failure { code: None } => write!(f, "termination by signal"),
        }
    }
}

/// A launched process.
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id, if still known
    fn id(&self) -> Option<u32>;

    /// Whether the process has not exited yet.
    fn is_running(&mut self) -> bool;

    /// Wait for the process to exit.
    async fn wait(&mut self) -> Result<ExitOutcome, ProcessError>;

    /// Kill the process and reap it.
    async fn kill(&mut self) -> Result<(), ProcessError>;
}

/// Starts processes from a [`LaunchSpec`].
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ProcessHandle>, ProcessError>;
}
