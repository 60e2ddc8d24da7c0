//! Child processes via `tokio::process`.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::domain::{ExitOutcome, LaunchSpec, ProcessError, ProcessHandle, ProcessLauncher};

/// Launches instances as child processes sharing the supervisor's stdout/stderr.
///
/// Children are killed when their handle is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessLauncher;

impl ProcessLauncher for TokioProcessLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.display().to_string(),
                source,
            })?;

        tracing::debug!("Launched '{}' (pid {:?})", spec, child.id());
        Ok(Box::new(TokioProcessHandle { child }))
    }
}

/// [`ProcessHandle`] over a `tokio::process::Child`.
#[derive(Debug)]
pub struct TokioProcessHandle {
    child: Child,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    async fn wait(&mut self) -> Result<ExitOutcome, ProcessError> {
        let status = self.child.wait().await.map_err(ProcessError::Wait)?;
        Ok(exit_outcome(status))
    }

    async fn kill(&mut self) -> Result<(), ProcessError> {
        self.child.kill().await.map_err(ProcessError::Kill)
    }
}

fn exit_outcome(status: ExitStatus) -> ExitOutcome {
    if status.success() {
        ExitOutcome::Success
    } else {
        ExitOutcome::Failure {
            code: status.code(),
        }
    }
}
