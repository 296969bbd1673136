//! Process platform capability
//!
//! Everything the orchestration needs from the operating system goes through
//! [`ProcessPlatform`]: the process table, foreground handling, signals and
//! bounded waits. [`crate::system::SystemPlatform`] backs it with the real OS.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Handle to an OS process.
///
/// Only identity is stored. Liveness is always asked of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessRef {
    pid: u32,
    name: String,
}

impl ProcessRef {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }

    /// Get process ID
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Display name as reported by the process table
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ProcessRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.pid)
    }
}

/// OS operations used while shutting processes down
#[async_trait]
pub trait ProcessPlatform: Send + Sync {
    /// All live processes whose name matches `name`
    fn processes_by_name(&self, name: &str) -> Result<Vec<ProcessRef>>;

    /// The live process with id `pid`, if any
    fn process_by_id(&self, pid: u32) -> Result<Option<ProcessRef>>;

    /// Whether `pid` is still running. Exited or unknown processes are not.
    fn is_alive(&self, pid: u32) -> bool;

    /// Direct parent of `pid`, read from a fresh process-table snapshot
    fn parent_of(&self, pid: u32) -> Result<Option<ProcessRef>>;

    /// Bring the process's interactive surface to the foreground.
    ///
    /// Returns `Ok(false)` when the process has nothing that can take focus.
    fn bring_to_foreground(&self, process: &ProcessRef) -> Result<bool>;

    /// Deliver the graceful console interrupt
    fn send_interrupt(&self, pid: u32) -> Result<()>;

    /// Terminate immediately and unconditionally
    fn terminate(&self, pid: u32) -> Result<()>;

    /// Wait up to `timeout` for `pid` to exit; `Ok(true)` once it has.
    ///
    /// Returns immediately for a process that is already gone.
    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> Result<bool>;
}
