//! Time-budgeted wait across all targets

use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    budget::TimeBudget,
    platform::{ProcessPlatform, ProcessRef},
    report::RunReporter,
    resolver::TargetSet,
};

/// How the wait ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every target exited
    AllExited,
    /// The budget ran out with processes still alive
    TimedOut,
    /// The cancellation token fired
    Cancelled,
}

/// Result of [`WaitScheduler::wait`]
#[derive(Debug, Clone)]
pub struct WaitReport {
    pub outcome: WaitOutcome,
    /// Targets still alive when the wait ended
    pub survivors: Vec<ProcessRef>,
    /// Number of slices fully waited out
    pub slices_consumed: usize,
}

/// Polls targets in bounded slices until they exit or the budget runs out
pub struct WaitScheduler<'a, P: ?Sized> {
    platform: &'a P,
    max_slice: Duration,
}

impl<'a, P: ProcessPlatform + ?Sized> WaitScheduler<'a, P> {
    pub fn new(platform: &'a P, max_slice: Duration) -> Self {
        Self {
            platform,
            max_slice,
        }
    }

    /// Wait for `targets` to exit within `budget`.
    ///
    /// Each slice waits on every live target concurrently and ends once all of
    /// those waits return, so the slice length is a ceiling shared by all.
    pub async fn wait(
        &self,
        targets: &TargetSet,
        budget: TimeBudget,
        cancel: &CancellationToken,
        reporter: &dyn RunReporter,
    ) -> WaitReport {
        let mut slices = budget.slices(self.max_slice);
        let mut consumed = 0;

        loop {
            let alive = self.alive(targets);
            if alive.is_empty() {
                debug!(slices = consumed, "All targets exited");
                return WaitReport {
                    outcome: WaitOutcome::AllExited,
                    survivors: alive,
                    slices_consumed: consumed,
                };
            }

            let Some(slice) = slices.next() else {
                debug!(slices = consumed, remaining = alive.len(), "Wait budget exhausted");
                return WaitReport {
                    outcome: WaitOutcome::TimedOut,
                    survivors: alive,
                    slices_consumed: consumed,
                };
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(slices = consumed, "Wait cancelled");
                    return WaitReport {
                        outcome: WaitOutcome::Cancelled,
                        survivors: self.alive(targets),
                        slices_consumed: consumed,
                    };
                }
                _ = self.wait_slice(&alive, slice) => {}
            }

            consumed += 1;
            reporter.slice_elapsed(consumed, slice);
        }
    }

    fn alive(&self, targets: &TargetSet) -> Vec<ProcessRef> {
        targets
            .iter()
            .filter(|process| self.platform.is_alive(process.pid()))
            .cloned()
            .collect()
    }

    async fn wait_slice(&self, alive: &[ProcessRef], slice: Duration) {
        let waits = alive.iter().map(|process| async move {
            match self.platform.wait_for_exit(process.pid(), slice).await {
                Ok(true) => debug!(pid = %process.pid(), "Process exited"),
                Ok(false) => {}
                // Liveness is re-queried on the next tick
                Err(e) => warn!(pid = %process.pid(), error = %e, "Wait for exit failed"),
            }
        });
        join_all(waits).await;
    }
}
