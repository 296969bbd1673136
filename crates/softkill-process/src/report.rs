//! Operator-facing progress hooks

use std::time::Duration;

use crate::{initiator::SignalFailure, platform::ProcessRef};

/// Receives user-visible events as the run progresses.
///
/// Calls happen immediately as each event occurs, never batched, so warnings
/// line up with what the operator sees in their own process list.
pub trait RunReporter: Send + Sync {
    /// About to signal `process`
    fn shutting_down(&self, process: &ProcessRef);

    /// No interrupt reached `process`
    fn signal_failed(&self, process: &ProcessRef, failure: &SignalFailure);

    /// `process` was force-terminated
    fn killed(&self, process: &ProcessRef);

    /// Forced termination of `process` failed
    fn kill_failed(&self, process: &ProcessRef, reason: &str);

    /// Slice number `index` (1-based) of length `slice` has elapsed
    fn slice_elapsed(&self, index: usize, slice: Duration);

    /// `process` outlived the wait and was left running
    fn did_not_shut_down(&self, process: &ProcessRef);
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl RunReporter for SilentReporter {
    fn shutting_down(&self, _process: &ProcessRef) {}
    fn signal_failed(&self, _process: &ProcessRef, _failure: &SignalFailure) {}
    fn killed(&self, _process: &ProcessRef) {}
    fn kill_failed(&self, _process: &ProcessRef, _reason: &str) {}
    fn slice_elapsed(&self, _index: usize, _slice: Duration) {}
    fn did_not_shut_down(&self, _process: &ProcessRef) {}
}
