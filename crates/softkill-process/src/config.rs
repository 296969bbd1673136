//! Shutdown run configuration

use std::time::Duration;

use crate::{
    budget::TimeBudget,
    error::{ProcessError, Result},
    resolver::LookupMode,
};

/// Upper bound of a single polling slice (5s)
pub const DEFAULT_MAX_SLICE_MS: u64 = 5000;

/// Configuration for one termination run
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Process names or ids, as typed by the operator
    pub targets: Vec<String>,
    /// How `targets` are interpreted
    pub lookup: LookupMode,
    /// Total wait budget (None = wait until every target exits)
    pub timeout: Option<Duration>,
    /// Force-terminate anything still alive once the budget runs out
    pub kill: bool,
    /// Largest slice the wait is broken into
    pub max_slice: Duration,
}

impl ShutdownConfig {
    /// Create new configuration for the given targets, looked up by name
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            lookup: LookupMode::Name,
            timeout: None,
            kill: false,
            max_slice: Duration::from_millis(DEFAULT_MAX_SLICE_MS),
        }
    }

    /// Set lookup mode
    pub fn lookup(mut self, lookup: LookupMode) -> Self {
        self.lookup = lookup;
        self
    }

    /// Interpret targets as numeric process ids
    pub fn by_pid(self) -> Self {
        self.lookup(LookupMode::Pid)
    }

    /// Set timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Some(Duration::from_millis(ms));
        self
    }

    /// Set timeout duration
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable/disable kill escalation
    pub fn kill(mut self, kill: bool) -> Self {
        self.kill = kill;
        self
    }

    /// Set the maximum slice duration
    pub fn max_slice(mut self, max_slice: Duration) -> Self {
        self.max_slice = max_slice;
        self
    }

    /// Wait budget described by this configuration
    pub fn budget(&self) -> TimeBudget {
        TimeBudget::new(self.timeout)
    }

    /// Reject configurations that cannot produce a terminating run
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(ProcessError::invalid_argument("no target processes given"));
        }
        if self.max_slice.is_zero() {
            return Err(ProcessError::invalid_argument(
                "maximum slice duration must be greater than 0",
            ));
        }
        Ok(())
    }
}
