//! UseCase: keep one chat server instance running.
//!
//! ```text
//! Idle <-> Running -> Failed -> Idle (after cool-down)
//! ```
//!
//! The supervisor only ever clears the activation flag. Turning it back on is
//! the fleet monitor's job.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    config::SupervisorTimings,
    domain::{ExitOutcome, InstanceDescriptor, LaunchSpec, PortProbe, ProcessLauncher},
};

/// Result of one pass through the supervision loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionStep {
    /// The flag is cleared; nothing was attempted
    Inactive,
    /// The port was taken; the flag is untouched
    PortBusy,
    /// The process ran and exited with status 0
    Exited,
    /// Launch or process failed; the flag was cleared
    Failed,
    /// Shutdown was requested
    Cancelled,
}

/// Supervision loop of one instance.
pub struct InstanceSupervisor {
    instance: InstanceDescriptor,
    spec: LaunchSpec,
    launcher: Arc<dyn ProcessLauncher>,
    probe: Arc<dyn PortProbe>,
    timings: SupervisorTimings,
}

impl InstanceSupervisor {
    pub fn new(
        instance: InstanceDescriptor,
        spec: LaunchSpec,
        launcher: Arc<dyn ProcessLauncher>,
        probe: Arc<dyn PortProbe>,
        timings: SupervisorTimings,
    ) -> Self {
        Self {
            instance,
            spec,
            launcher,
            probe,
            timings,
        }
    }

    /// Loop until `shutdown` fires.
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            "Supervising instance {} on port {}",
            self.instance.id,
            self.instance.port
        );

        loop {
            let pause = match self.step(&shutdown).await {
                SupervisionStep::Inactive | SupervisionStep::Exited => self.timings.poll_interval,
                SupervisionStep::PortBusy => self.timings.port_busy_delay,
                SupervisionStep::Failed => self.timings.failure_cooldown,
                SupervisionStep::Cancelled => break,
            };

            if !sleep_or_cancel(pause, &shutdown).await {
                break;
            }
        }

        tracing::info!("Stopped supervising instance {}", self.instance.id);
    }

    /// One pass: check the flag, probe the port, run the process to completion.
    pub async fn step(&self, shutdown: &CancellationToken) -> SupervisionStep {
        if shutdown.is_cancelled() {
            return SupervisionStep::Cancelled;
        }
        if !self.instance.flag.is_active() {
            return SupervisionStep::Inactive;
        }

        let port = self.instance.port;
        if !self.probe.is_available(port).await {
            tracing::warn!(
                "Port {} is not available. Retrying in {:?}",
                port,
                self.timings.port_busy_delay
            );
            return SupervisionStep::PortBusy;
        }

        tracing::info!("Starting instance {} on port {}", self.instance.id, port);
        let mut handle = match self.launcher.launch(&self.spec) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("Instance {}: {}", self.instance.id, e);
                return self.fail(None);
            }
        };

        let waited = tokio::select! {
            _ = shutdown.cancelled() => None,
            outcome = handle.wait() => Some(outcome),
        };

        match waited {
            None => {
                tracing::info!("Stopping instance {} for shutdown", self.instance.id);
                if let Err(e) = handle.kill().await {
                    tracing::warn!("Instance {}: {}", self.instance.id, e);
                }
                SupervisionStep::Cancelled
            }
            Some(Ok(ExitOutcome::Success)) => {
                tracing::info!("Instance {} exited cleanly", self.instance.id);
                SupervisionStep::Exited
            }
            Some(Ok(outcome)) => self.fail(Some(outcome)),
            Some(Err(e)) => {
                tracing::error!("Instance {}: {}", self.instance.id, e);
                self.fail(None)
            }
        }
    }

    fn fail(&self, outcome: Option<ExitOutcome>) -> SupervisionStep {
        let failures = self.instance.record_failure();
        self.instance.flag.deactivate();

        match outcome {
            Some(outcome) => tracing::error!(
                "Instance {} stopped with {} (failure #{}). Cooling down for {:?}",
                self.instance.id,
                outcome,
                failures,
                self.timings.failure_cooldown
            ),
            None => tracing::error!(
                "Instance {} could not run (failure #{}). Cooling down for {:?}",
                self.instance.id,
                failures,
                self.timings.failure_cooldown
            ),
        }

        SupervisionStep::Failed
    }
}

/// Returns `false` if shutdown fired before the pause elapsed.
async fn sleep_or_cancel(pause: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(pause) => true,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        path::PathBuf,
        sync::{
            Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{InstanceId, MockPortProbe, ProcessError, ProcessHandle};

    /// Launcher replaying a fixed list of exit outcomes; fails to launch once empty.
    struct ScriptedLauncher {
        outcomes: Mutex<VecDeque<ExitOutcome>>,
        run_for: Duration,
        launches: AtomicUsize,
        killed: Arc<AtomicBool>,
    }

    impl ScriptedLauncher {
        fn new(outcomes: Vec<ExitOutcome>, run_for: Duration) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                run_for,
                launches: AtomicUsize::new(0),
                killed: Arc::new(AtomicBool::new(false)),
            }
        }

        fn launches(&self) -> usize {
            self.launches.load(Ordering::SeqCst)
        }
    }

    impl ProcessLauncher for ScriptedLauncher {
        fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ProcessHandle>, ProcessError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            match self.outcomes.lock().unwrap().pop_front() {
                Some(outcome) => Ok(Box::new(ScriptedHandle {
                    outcome,
                    run_for: self.run_for,
                    finished: false,
                    killed: self.killed.clone(),
                })),
                None => Err(ProcessError::Spawn {
                    program: spec.program.display().to_string(),
                    source: std::io::Error::other("script exhausted"),
                }),
            }
        }
    }

    struct ScriptedHandle {
        outcome: ExitOutcome,
        run_for: Duration,
        finished: bool,
        killed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ProcessHandle for ScriptedHandle {
        fn id(&self) -> Option<u32> {
            None
        }

        fn is_running(&mut self) -> bool {
            !self.finished
        }

        async fn wait(&mut self) -> Result<ExitOutcome, ProcessError> {
            if !self.run_for.is_zero() {
                tokio::time::sleep(self.run_for).await;
            }
            self.finished = true;
            Ok(self.outcome)
        }

        async fn kill(&mut self) -> Result<(), ProcessError> {
            self.killed.store(true, Ordering::SeqCst);
            self.finished = true;
            Ok(())
        }
    }

    fn available_probe() -> MockPortProbe {
        let mut probe = MockPortProbe::new();
        probe.expect_is_available().returning(|_| true);
        probe
    }

    fn create_supervisor(
        launcher: Arc<ScriptedLauncher>,
        probe: MockPortProbe,
    ) -> (InstanceSupervisor, InstanceDescriptor) {
        let instance = InstanceDescriptor::new(InstanceId::new(1), 5000);
        let spec = LaunchSpec {
            program: PathBuf::from("charla-server"),
            args: vec!["serve".to_string()],
        };
        let supervisor = InstanceSupervisor::new(
            instance.clone(),
            spec,
            launcher,
            Arc::new(probe),
            SupervisorTimings::default(),
        );
        (supervisor, instance)
    }

    #[tokio::test]
    async fn test_inactive_instance_is_not_launched() {
        // given:
        let launcher = Arc::new(ScriptedLauncher::new(vec![ExitOutcome::Success], Duration::ZERO));
        let mut probe = MockPortProbe::new();
        probe.expect_is_available().times(0);
        let (supervisor, instance) = create_supervisor(launcher.clone(), probe);
        instance.flag.deactivate();

        // when:
        let step = supervisor.step(&CancellationToken::new()).await;

        // then:
        assert_eq!(step, SupervisionStep::Inactive);
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn test_busy_port_skips_launch_and_keeps_flag() {
        // given:
        let launcher = Arc::new(ScriptedLauncher::new(vec![ExitOutcome::Success], Duration::ZERO));
        let mut probe = MockPortProbe::new();
        probe
            .expect_is_available()
            .withf(|port| *port == 5000)
            .times(1)
            .returning(|_| false);
        let (supervisor, instance) = create_supervisor(launcher.clone(), probe);

        // when:
        let step = supervisor.step(&CancellationToken::new()).await;

        // then:
        assert_eq!(step, SupervisionStep::PortBusy);
        assert_eq!(launcher.launches(), 0);
        assert!(instance.flag.is_active());
    }

    #[tokio::test]
    async fn test_failed_process_clears_flag() {
        // given:
        let launcher = Arc::new(ScriptedLauncher::new(
            vec![ExitOutcome::Failure { code: Some(1) }],
            Duration::ZERO,
        ));
        let (supervisor, instance) = create_supervisor(launcher.clone(), available_probe());

        // when:
        let step = supervisor.step(&CancellationToken::new()).await;

        // then:
        assert_eq!(step, SupervisionStep::Failed);
        assert_eq!(launcher.launches(), 1);
        assert!(!instance.flag.is_active());
        assert_eq!(instance.failures(), 1);
    }

    #[tokio::test]
    async fn test_clean_exit_keeps_flag() {
        // given:
        let launcher = Arc::new(ScriptedLauncher::new(vec![ExitOutcome::Success], Duration::ZERO));
        let (supervisor, instance) = create_supervisor(launcher.clone(), available_probe());

        // when:
        let step = supervisor.step(&CancellationToken::new()).await;

        // then:
        assert_eq!(step, SupervisionStep::Exited);
        assert!(instance.flag.is_active());
        assert_eq!(instance.failures(), 0);
    }

    #[tokio::test]
    async fn test_launch_error_counts_as_failure() {
        // given: nothing left to launch
        let launcher = Arc::new(ScriptedLauncher::new(vec![], Duration::ZERO));
        let (supervisor, instance) = create_supervisor(launcher.clone(), available_probe());

        // when:
        let step = supervisor.step(&CancellationToken::new()).await;

        // then:
        assert_eq!(step, SupervisionStep::Failed);
        assert!(!instance.flag.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_kills_running_process() {
        // given: a process that would run for a minute
        let launcher = Arc::new(ScriptedLauncher::new(
            vec![ExitOutcome::Success],
            Duration::from_secs(60),
        ));
        let (supervisor, instance) = create_supervisor(launcher.clone(), available_probe());
        let shutdown = CancellationToken::new();

        // when: shutdown arrives while it runs
        let (step, _) = tokio::join!(supervisor.step(&shutdown), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            shutdown.cancel();
        });

        // then:
        assert_eq!(step, SupervisionStep::Cancelled);
        assert!(launcher.killed.load(Ordering::SeqCst));
        assert!(instance.flag.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_for_revival_after_failure() {
        // given: the first run fails, the second exits cleanly
        let launcher = Arc::new(ScriptedLauncher::new(
            vec![
                ExitOutcome::Failure { code: Some(2) },
                ExitOutcome::Success,
            ],
            Duration::ZERO,
        ));
        let (supervisor, instance) = create_supervisor(launcher.clone(), available_probe());
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(supervisor.run(shutdown.clone()));

        // when: the first run has failed
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(launcher.launches(), 1);
        assert!(!instance.flag.is_active());

        // then: nothing is relaunched while the flag stays cleared
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(launcher.launches(), 1);

        // when: the flag is turned back on
        instance.flag.activate();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        // then: the instance ran again and exited cleanly
        assert_eq!(launcher.launches(), 2);
        assert!(instance.flag.is_active());

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_port_is_retried_after_delay() {
        // given: the port is busy once, then free
        let launcher = Arc::new(ScriptedLauncher::new(
            vec![ExitOutcome::Success],
            Duration::from_secs(3600),
        ));
        let mut probe = MockPortProbe::new();
        let mut busy = true;
        probe.expect_is_available().returning(move |_| {
            let available = !busy;
            busy = false;
            available
        });
        let (supervisor, _instance) = create_supervisor(launcher.clone(), probe);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(supervisor.run(shutdown.clone()));

        // when / then: no launch before the port-busy delay elapses
        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert_eq!(launcher.launches(), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(launcher.launches(), 1);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
