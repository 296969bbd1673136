//! OS-backed process platform
//!
//! The process table comes from `sysinfo`; signals go through `nix` on Unix.
//! Unix has no window manager to ask for focus, so a process counts as
//! foreground-capable when it is attached to a controlling terminal, i.e. it
//! belongs to an interactive session that a console interrupt could reach.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sysinfo::{Pid, Process, ProcessStatus, System};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::{
    error::{ProcessError, Result},
    platform::{ProcessPlatform, ProcessRef},
};

/// Liveness poll period while waiting for exit
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// [`ProcessPlatform`] for the local machine
pub struct SystemPlatform {
    system: Mutex<System>,
    poll_interval: Duration,
}

impl SystemPlatform {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set how often liveness is re-checked while waiting
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn live_ref(system: &mut System, pid: u32) -> Option<ProcessRef> {
        let sys_pid = Pid::from_u32(pid);
        if !system.refresh_process(sys_pid) {
            return None;
        }
        system
            .process(sys_pid)
            .filter(|p| is_running(p))
            .map(|p| ProcessRef::new(pid, display_name(p)))
    }
}

impl Default for SystemPlatform {
    fn default() -> Self {
        Self::new()
    }
}

fn is_running(process: &Process) -> bool {
    !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead)
}

/// Kernel limit on the comm name Linux reports for a process
pub const COMM_NAME_MAX: usize = 15;

/// Process name, recovered from the executable path or argv[0] when the
/// table only holds the kernel's truncated comm name
fn display_name(process: &Process) -> String {
    let exe = process.exe().map(Path::to_path_buf);
    let argv0 = process.cmd().first().map(PathBuf::from);
    full_name(process.name(), [exe, argv0].into_iter().flatten())
}

/// Pick the untruncated name among `candidates` (paths whose file name
/// extends `comm`), falling back to `comm`
pub fn full_name<I>(comm: &str, candidates: I) -> String
where
    I: IntoIterator<Item = PathBuf>,
{
    if comm.len() < COMM_NAME_MAX {
        return comm.to_string();
    }
    candidates
        .into_iter()
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .find(|name| name.len() > comm.len() && name.starts_with(comm))
        .unwrap_or_else(|| comm.to_string())
}

/// Match a process-table name against an operator-supplied one, ignoring a
/// trailing `.exe` on the table side
pub fn name_matches(process_name: &str, wanted: &str) -> bool {
    if process_name == wanted {
        return true;
    }
    match process_name.len().checked_sub(4) {
        Some(stem_len) if process_name.is_char_boundary(stem_len) => {
            let (stem, ext) = process_name.split_at(stem_len);
            ext.eq_ignore_ascii_case(".exe") && stem == wanted
        }
        _ => false,
    }
}

/// Controlling terminal number from the contents of `/proc/<pid>/stat`
pub fn parse_tty_nr(stat: &str) -> Option<i64> {
    // comm may contain spaces and parens; fields resume after the last ')'
    let rest = &stat[stat.rfind(')')? + 1..];
    // state ppid pgrp session tty_nr
    rest.split_whitespace().nth(4)?.parse().ok()
}

#[cfg(unix)]
fn nix_pid(pid: u32) -> Result<nix::unistd::Pid> {
    i32::try_from(pid)
        .map(nix::unistd::Pid::from_raw)
        .map_err(|_| ProcessError::invalid_argument(format!("pid {} out of range", pid)))
}

#[async_trait]
impl ProcessPlatform for SystemPlatform {
    fn processes_by_name(&self, name: &str) -> Result<Vec<ProcessRef>> {
        let mut system = self.system.lock();
        system.refresh_processes();

        let mut found: Vec<ProcessRef> = system
            .processes()
            .iter()
            .filter(|(_, p)| is_running(p))
            .map(|(pid, p)| ProcessRef::new(pid.as_u32(), display_name(p)))
            .filter(|p| name_matches(p.name(), name))
            .collect();
        found.sort_by_key(ProcessRef::pid);

        debug!(name = %name, matches = found.len(), "Looked up processes by name");
        Ok(found)
    }

    fn process_by_id(&self, pid: u32) -> Result<Option<ProcessRef>> {
        Ok(Self::live_ref(&mut self.system.lock(), pid))
    }

    fn is_alive(&self, pid: u32) -> bool {
        Self::live_ref(&mut self.system.lock(), pid).is_some()
    }

    fn parent_of(&self, pid: u32) -> Result<Option<ProcessRef>> {
        // Fresh snapshot per lookup; the relationship may have changed since
        let mut snapshot = System::new();
        snapshot.refresh_processes();

        let parent = snapshot
            .process(Pid::from_u32(pid))
            .and_then(Process::parent)
            .and_then(|ppid| snapshot.process(ppid))
            .filter(|p| is_running(p))
            .map(|p| ProcessRef::new(p.pid().as_u32(), display_name(p)));
        Ok(parent)
    }

    #[cfg(target_os = "linux")]
    fn bring_to_foreground(&self, process: &ProcessRef) -> Result<bool> {
        let stat = std::fs::read_to_string(format!("/proc/{}/stat", process.pid()))?;
        let tty = parse_tty_nr(&stat).ok_or_else(|| {
            ProcessError::Platform(format!("unreadable stat for pid {}", process.pid()))
        })?;
        debug!(pid = %process.pid(), tty, "Controlling terminal");
        Ok(tty != 0)
    }

    #[cfg(all(unix, not(target_os = "linux")))]
    fn bring_to_foreground(&self, process: &ProcessRef) -> Result<bool> {
        Ok(self.is_alive(process.pid()))
    }

    #[cfg(not(unix))]
    fn bring_to_foreground(&self, process: &ProcessRef) -> Result<bool> {
        debug!(pid = %process.pid(), "No foreground support on this platform");
        Ok(false)
    }

    #[cfg(unix)]
    fn send_interrupt(&self, pid: u32) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};

        match kill(nix_pid(pid)?, Signal::SIGINT) {
            // Already gone counts as delivered
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(ProcessError::SignalDeliveryFailed {
                pid,
                reason: e.to_string(),
            }),
        }
    }

    #[cfg(not(unix))]
    fn send_interrupt(&self, _pid: u32) -> Result<()> {
        Err(ProcessError::Unsupported("console interrupt delivery"))
    }

    #[cfg(unix)]
    fn terminate(&self, pid: u32) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};

        match kill(nix_pid(pid)?, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(ProcessError::KillFailed {
                pid,
                reason: e.to_string(),
            }),
        }
    }

    #[cfg(not(unix))]
    fn terminate(&self, pid: u32) -> Result<()> {
        let mut system = self.system.lock();
        let sys_pid = Pid::from_u32(pid);
        if !system.refresh_process(sys_pid) {
            return Ok(());
        }
        match system.process(sys_pid) {
            Some(process) if !process.kill() => Err(ProcessError::KillFailed {
                pid,
                reason: "terminate request refused".to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.is_alive(pid) {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
