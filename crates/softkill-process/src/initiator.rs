//! Graceful shutdown initiation

use std::fmt;

use tracing::{debug, info};

use crate::{
    platform::{ProcessPlatform, ProcessRef},
    report::RunReporter,
    resolver::TargetSet,
};

/// Why no interrupt reached a process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalFailure {
    /// Neither the process nor its parent could be brought to the foreground
    NoForegroundWindow,
    /// The foreground switch worked but delivering the interrupt failed
    DeliveryFailed(String),
}

impl fmt::Display for SignalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoForegroundWindow => write!(f, "no foreground window"),
            Self::DeliveryFailed(reason) => write!(f, "interrupt delivery failed: {}", reason),
        }
    }
}

/// Result of the initiation phase for one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    Signaled,
    SignalFailed(SignalFailure),
}

impl ShutdownOutcome {
    pub fn is_signaled(&self) -> bool {
        matches!(self, Self::Signaled)
    }
}

/// A process together with its initiation outcome
#[derive(Debug, Clone)]
pub struct Initiation {
    pub process: ProcessRef,
    pub outcome: ShutdownOutcome,
}

/// Delivers the graceful interrupt to each live target
pub struct ShutdownInitiator<'a, P: ?Sized> {
    platform: &'a P,
}

impl<'a, P: ProcessPlatform + ?Sized> ShutdownInitiator<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    /// Signal every target that is still alive.
    ///
    /// Targets that exited since resolution are skipped. Nothing here is
    /// fatal: every failure becomes a [`ShutdownOutcome::SignalFailed`].
    pub fn initiate(&self, targets: &TargetSet, reporter: &dyn RunReporter) -> Vec<Initiation> {
        targets
            .iter()
            .filter_map(|process| self.initiate_one(process, reporter))
            .collect()
    }

    /// Signal one target, or `None` if it already exited
    pub fn initiate_one(&self, process: &ProcessRef, reporter: &dyn RunReporter) -> Option<Initiation> {
        if !self.platform.is_alive(process.pid()) {
            debug!(pid = %process.pid(), "Process exited before it was signaled");
            return None;
        }

        reporter.shutting_down(process);
        let outcome = self.signal(process);
        if let ShutdownOutcome::SignalFailed(failure) = &outcome {
            info!(pid = %process.pid(), name = %process.name(), %failure, "Could not signal process");
            reporter.signal_failed(process, failure);
        }
        Some(Initiation {
            process: process.clone(),
            outcome,
        })
    }

    fn signal(&self, process: &ProcessRef) -> ShutdownOutcome {
        let Some(focused) = self.focus(process) else {
            return ShutdownOutcome::SignalFailed(SignalFailure::NoForegroundWindow);
        };

        debug!(pid = %process.pid(), via = %focused, "Foreground acquired, sending interrupt");
        match self.platform.send_interrupt(process.pid()) {
            Ok(()) => {
                info!(pid = %process.pid(), "Interrupt delivered");
                ShutdownOutcome::Signaled
            }
            Err(e) => ShutdownOutcome::SignalFailed(SignalFailure::DeliveryFailed(e.to_string())),
        }
    }

    /// Bring the process, or failing that its parent, to the foreground.
    /// Returns whichever one took focus.
    fn focus(&self, process: &ProcessRef) -> Option<ProcessRef> {
        if self.try_foreground(process) {
            return Some(process.clone());
        }

        let parent = match self.platform.parent_of(process.pid()) {
            Ok(Some(parent)) => parent,
            Ok(None) => {
                debug!(pid = %process.pid(), "Process has no parent");
                return None;
            }
            Err(e) => {
                debug!(pid = %process.pid(), error = %e, "Parent lookup failed");
                return None;
            }
        };

        self.try_foreground(&parent).then_some(parent)
    }

    fn try_foreground(&self, process: &ProcessRef) -> bool {
        match self.platform.bring_to_foreground(process) {
            Ok(focused) => focused,
            Err(e) => {
                debug!(pid = %process.pid(), error = %e, "Foreground request failed");
                false
            }
        }
    }
}
