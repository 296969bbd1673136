//! End-to-end termination run

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    config::ShutdownConfig,
    error::Result,
    escalation::{Escalation, EscalationHandler, EscalationReason, FailureKind, RunFailure},
    initiator::{Initiation, ShutdownInitiator, ShutdownOutcome},
    platform::{ProcessPlatform, ProcessRef},
    report::RunReporter,
    resolver::ProcessResolver,
    scheduler::{WaitOutcome, WaitScheduler},
};

/// Everything that happened during one run
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Initiation outcome for each process that was alive at signal time
    pub initiations: Vec<Initiation>,
    /// Processes force-terminated, in order
    pub killed: Vec<ProcessRef>,
    /// Per-process failures that were not cured by a kill
    pub failures: Vec<RunFailure>,
    /// Slices the wait consumed
    pub slices_consumed: usize,
    /// Whether the wait was cut short by cancellation
    pub cancelled: bool,
}

impl RunResult {
    /// Whether anything was left unresolved
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Process exit status for this result
    pub fn exit_code(&self) -> i32 {
        if self.failed() {
            1
        } else {
            0
        }
    }

    fn record(&mut self, escalation: Escalation) {
        match escalation {
            Escalation::Killed(process) => self.killed.push(process),
            Escalation::Failed(failure) => self.failures.push(failure),
        }
    }
}

/// Sequences resolve, initiate, wait and escalate
pub struct Orchestrator<P> {
    platform: P,
    config: ShutdownConfig,
}

impl<P: ProcessPlatform> Orchestrator<P> {
    pub fn new(platform: P, config: ShutdownConfig) -> Self {
        Self { platform, config }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn config(&self) -> &ShutdownConfig {
        &self.config
    }

    /// Run the full shutdown.
    ///
    /// Errors only for invalid configuration or when resolution fails; in
    /// both cases no process has been touched. Per-process problems end up in
    /// [`RunResult::failures`].
    pub async fn run(&self, reporter: &dyn RunReporter, cancel: &CancellationToken) -> Result<RunResult> {
        self.config.validate()?;

        let targets =
            ProcessResolver::new(&self.platform).resolve(&self.config.targets, self.config.lookup)?;
        info!(count = targets.len(), kill = self.config.kill, "Shutting down targets");

        let escalation = EscalationHandler::new(&self.platform, self.config.kill);
        let mut result = RunResult::default();

        // Unsignalable processes are escalated before the next target is signaled
        let initiator = ShutdownInitiator::new(&self.platform);
        for process in &targets {
            let Some(initiation) = initiator.initiate_one(process, reporter) else {
                continue;
            };
            if let ShutdownOutcome::SignalFailed(failure) = &initiation.outcome {
                let reason = EscalationReason::Unsignaled(failure.clone());
                result.record(escalation.escalate(&initiation.process, reason, reporter));
            }
            result.initiations.push(initiation);
        }

        let report = WaitScheduler::new(&self.platform, self.config.max_slice)
            .wait(&targets, self.config.budget(), cancel, reporter)
            .await;
        result.slices_consumed = report.slices_consumed;

        match report.outcome {
            WaitOutcome::AllExited => debug!("Every target exited"),
            WaitOutcome::TimedOut => {
                for process in &report.survivors {
                    result.record(escalation.escalate(
                        process,
                        EscalationReason::SurvivedTimeout,
                        reporter,
                    ));
                }
            }
            WaitOutcome::Cancelled => {
                result.cancelled = true;
                for process in report.survivors {
                    reporter.did_not_shut_down(&process);
                    result.failures.push(RunFailure {
                        process,
                        kind: FailureKind::Cancelled,
                    });
                }
            }
        }

        info!(
            killed = result.killed.len(),
            failures = result.failures.len(),
            "Shutdown run finished"
        );
        Ok(result)
    }
}
