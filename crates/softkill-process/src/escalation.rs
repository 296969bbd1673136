//! Kill escalation for processes that would not shut down

use tracing::{info, warn};

use crate::{
    initiator::SignalFailure,
    platform::{ProcessPlatform, ProcessRef},
    report::RunReporter,
};

/// Why a process is being escalated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationReason {
    /// The graceful interrupt never reached it
    Unsignaled(SignalFailure),
    /// It was still alive when the wait budget ran out
    SurvivedTimeout,
}

/// A per-process failure that counts against the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Not signaled, and not killed
    Unsignaled(SignalFailure),
    /// Outlived the wait, and not killed
    SurvivedTimeout,
    /// Still running when the wait was cancelled
    Cancelled,
    /// Kill was attempted and failed
    KillFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub process: ProcessRef,
    pub kind: FailureKind,
}

/// What escalation did with one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escalation {
    Killed(ProcessRef),
    Failed(RunFailure),
}

/// Applies the kill policy to processes that did not shut down
pub struct EscalationHandler<'a, P: ?Sized> {
    platform: &'a P,
    kill: bool,
}

impl<'a, P: ProcessPlatform + ?Sized> EscalationHandler<'a, P> {
    pub fn new(platform: &'a P, kill: bool) -> Self {
        Self { platform, kill }
    }

    /// Kill `process` when escalation is enabled, otherwise record a failure
    pub fn escalate(
        &self,
        process: &ProcessRef,
        reason: EscalationReason,
        reporter: &dyn RunReporter,
    ) -> Escalation {
        if !self.kill {
            if reason == EscalationReason::SurvivedTimeout {
                reporter.did_not_shut_down(process);
            }
            let kind = match reason {
                EscalationReason::Unsignaled(failure) => FailureKind::Unsignaled(failure),
                EscalationReason::SurvivedTimeout => FailureKind::SurvivedTimeout,
            };
            return Escalation::Failed(RunFailure {
                process: process.clone(),
                kind,
            });
        }

        match self.platform.terminate(process.pid()) {
            Ok(()) => {
                info!(pid = %process.pid(), ?reason, "Process killed");
                reporter.killed(process);
                Escalation::Killed(process.clone())
            }
            Err(e) => {
                warn!(pid = %process.pid(), error = %e, "Kill failed");
                let reason = e.to_string();
                reporter.kill_failed(process, &reason);
                Escalation::Failed(RunFailure {
                    process: process.clone(),
                    kind: FailureKind::KillFailed(reason),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlatform, MockProcess, RecordingReporter, ReportEvent};

    #[test]
    fn test_kill_enabled_terminates() {
        let platform = MockPlatform::new().with(MockProcess::new(7, "stuck").ignores_interrupt());
        let process = ProcessRef::new(7, "stuck");
        let reporter = RecordingReporter::new();

        let result = EscalationHandler::new(&platform, true).escalate(
            &process,
            EscalationReason::SurvivedTimeout,
            &reporter,
        );

        assert_eq!(result, Escalation::Killed(process));
        assert_eq!(platform.killed(), vec![7]);
        assert!(!platform.is_alive(7));
        assert_eq!(reporter.events(), vec![ReportEvent::Killed(7)]);
    }

    #[test]
    fn test_kill_disabled_records_failure_and_leaves_running() {
        let platform = MockPlatform::new().with(MockProcess::new(7, "stuck").ignores_interrupt());
        let process = ProcessRef::new(7, "stuck");
        let reporter = RecordingReporter::new();

        let result = EscalationHandler::new(&platform, false).escalate(
            &process,
            EscalationReason::SurvivedTimeout,
            &reporter,
        );

        assert!(matches!(
            result,
            Escalation::Failed(RunFailure { kind: FailureKind::SurvivedTimeout, .. })
        ));
        assert!(platform.killed().is_empty());
        assert!(platform.is_alive(7));
        assert_eq!(reporter.events(), vec![ReportEvent::DidNotShutDown(7)]);
    }

    #[test]
    fn test_unsignaled_without_kill_is_silent_failure() {
        let platform = MockPlatform::new().with(MockProcess::new(7, "daemon").without_window());
        let process = ProcessRef::new(7, "daemon");
        let reporter = RecordingReporter::new();

        let result = EscalationHandler::new(&platform, false).escalate(
            &process,
            EscalationReason::Unsignaled(SignalFailure::NoForegroundWindow),
            &reporter,
        );

        assert!(matches!(
            result,
            Escalation::Failed(RunFailure { kind: FailureKind::Unsignaled(_), .. })
        ));
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn test_kill_failure_is_recorded() {
        let platform = MockPlatform::new().with(MockProcess::new(7, "protected").kill_errors());
        let process = ProcessRef::new(7, "protected");
        let reporter = RecordingReporter::new();

        let result = EscalationHandler::new(&platform, true).escalate(
            &process,
            EscalationReason::SurvivedTimeout,
            &reporter,
        );

        assert!(matches!(
            result,
            Escalation::Failed(RunFailure { kind: FailureKind::KillFailed(_), .. })
        ));
        assert!(platform.is_alive(7));
    }
}
