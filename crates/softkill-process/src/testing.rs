//! Scripted platform and recording reporter for tests
//!
//! [`MockPlatform`] keeps an in-memory process table whose processes react to
//! interrupts after a configurable delay. Time comes from `tokio::time`, so
//! tests running with a paused clock get exact, instant timings.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::{
    error::{ProcessError, Result},
    initiator::SignalFailure,
    platform::{ProcessPlatform, ProcessRef},
    report::RunReporter,
};

/// Behaviour of one scripted process
#[derive(Debug, Clone)]
pub struct MockProcess {
    pid: u32,
    name: String,
    parent: Option<u32>,
    has_window: bool,
    exit_delay: Option<Duration>,
    foreground_errors: bool,
    parent_lookup_errors: bool,
    interrupt_errors: bool,
    kill_errors: bool,
}

impl MockProcess {
    /// A windowed process that exits as soon as it is interrupted
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            parent: None,
            has_window: true,
            exit_delay: Some(Duration::ZERO),
            foreground_errors: false,
            parent_lookup_errors: false,
            interrupt_errors: false,
            kill_errors: false,
        }
    }

    pub fn parent(mut self, pid: u32) -> Self {
        self.parent = Some(pid);
        self
    }

    pub fn without_window(mut self) -> Self {
        self.has_window = false;
        self
    }

    /// Exit `delay` after the interrupt arrives
    pub fn exits_after(mut self, delay: Duration) -> Self {
        self.exit_delay = Some(delay);
        self
    }

    /// Keep running after an interrupt
    pub fn ignores_interrupt(mut self) -> Self {
        self.exit_delay = None;
        self
    }

    pub fn foreground_errors(mut self) -> Self {
        self.foreground_errors = true;
        self
    }

    pub fn parent_lookup_errors(mut self) -> Self {
        self.parent_lookup_errors = true;
        self
    }

    pub fn interrupt_errors(mut self) -> Self {
        self.interrupt_errors = true;
        self
    }

    pub fn kill_errors(mut self) -> Self {
        self.kill_errors = true;
        self
    }

    fn to_ref(&self) -> ProcessRef {
        ProcessRef::new(self.pid, self.name.clone())
    }
}

#[derive(Debug)]
struct Entry {
    process: MockProcess,
    exit_at: Option<Instant>,
    gone: bool,
}

impl Entry {
    fn alive(&self, now: Instant) -> bool {
        !self.gone && self.exit_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
struct State {
    order: Vec<u32>,
    entries: HashMap<u32, Entry>,
    interrupted: Vec<u32>,
    focused: Vec<u32>,
    killed: Vec<u32>,
}

impl State {
    fn live(&self, pid: u32) -> Option<&Entry> {
        self.entries.get(&pid).filter(|e| e.alive(Instant::now()))
    }

    fn interrupt(&mut self, pid: u32) {
        let now = Instant::now();
        if let Some(entry) = self.entries.get_mut(&pid) {
            if entry.exit_at.is_none() {
                entry.exit_at = entry.process.exit_delay.map(|delay| now + delay);
            }
        }
        self.interrupted.push(pid);
    }
}

/// In-memory [`ProcessPlatform`]
#[derive(Debug, Default)]
pub struct MockPlatform {
    state: Mutex<State>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a process to the table
    pub fn with(self, process: MockProcess) -> Self {
        {
            let mut state = self.state.lock();
            state.order.push(process.pid);
            state.entries.insert(
                process.pid,
                Entry {
                    process,
                    exit_at: None,
                    gone: false,
                },
            );
        }
        self
    }

    /// Every live process, in insertion order
    pub fn all(&self) -> Vec<ProcessRef> {
        let state = self.state.lock();
        state
            .order
            .iter()
            .filter_map(|pid| state.live(*pid))
            .map(|e| e.process.to_ref())
            .collect()
    }

    /// Interrupt every process as if each had been signaled
    pub fn interrupt_all(&self) {
        let mut state = self.state.lock();
        let pids = state.order.clone();
        for pid in pids {
            state.interrupt(pid);
        }
    }

    /// Make `pid` exit right now
    pub fn exit_now(&self, pid: u32) {
        if let Some(entry) = self.state.lock().entries.get_mut(&pid) {
            entry.gone = true;
        }
    }

    /// Pids that received an interrupt, in order
    pub fn interrupted(&self) -> Vec<u32> {
        self.state.lock().interrupted.clone()
    }

    /// Pids successfully brought to the foreground, in order
    pub fn focused(&self) -> Vec<u32> {
        self.state.lock().focused.clone()
    }

    /// Pids terminated, in order
    pub fn killed(&self) -> Vec<u32> {
        self.state.lock().killed.clone()
    }
}

#[async_trait]
impl ProcessPlatform for MockPlatform {
    fn processes_by_name(&self, name: &str) -> Result<Vec<ProcessRef>> {
        Ok(self.all().into_iter().filter(|p| p.name() == name).collect())
    }

    fn process_by_id(&self, pid: u32) -> Result<Option<ProcessRef>> {
        Ok(self.state.lock().live(pid).map(|e| e.process.to_ref()))
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().live(pid).is_some()
    }

    fn parent_of(&self, pid: u32) -> Result<Option<ProcessRef>> {
        let state = self.state.lock();
        let Some(entry) = state.live(pid) else {
            return Ok(None);
        };
        if entry.process.parent_lookup_errors {
            return Err(ProcessError::Platform("process snapshot unavailable".to_string()));
        }
        Ok(entry
            .process
            .parent
            .and_then(|parent| state.live(parent))
            .map(|e| e.process.to_ref()))
    }

    fn bring_to_foreground(&self, process: &ProcessRef) -> Result<bool> {
        let mut state = self.state.lock();
        let Some(entry) = state.live(process.pid()) else {
            return Ok(false);
        };
        if entry.process.foreground_errors {
            return Err(ProcessError::Platform("window manager unavailable".to_string()));
        }
        if !entry.process.has_window {
            return Ok(false);
        }
        state.focused.push(process.pid());
        Ok(true)
    }

    fn send_interrupt(&self, pid: u32) -> Result<()> {
        let mut state = self.state.lock();
        if state.entries.get(&pid).is_some_and(|e| e.process.interrupt_errors) {
            return Err(ProcessError::SignalDeliveryFailed {
                pid,
                reason: "access denied".to_string(),
            });
        }
        state.interrupt(pid);
        Ok(())
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        let mut state = self.state.lock();
        let Some(entry) = state.entries.get_mut(&pid) else {
            return Ok(());
        };
        if entry.process.kill_errors {
            return Err(ProcessError::KillFailed {
                pid,
                reason: "access denied".to_string(),
            });
        }
        entry.gone = true;
        state.killed.push(pid);
        Ok(())
    }

    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        let exit_at = match self.state.lock().live(pid) {
            None => return Ok(true),
            Some(entry) => entry.exit_at,
        };

        match exit_at {
            Some(at) if at <= deadline => {
                sleep_until(at).await;
                Ok(true)
            }
            _ => {
                sleep_until(deadline).await;
                Ok(!self.is_alive(pid))
            }
        }
    }
}

/// One reporter callback, flattened to pids for easy comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    ShuttingDown(u32),
    SignalFailed(u32, SignalFailure),
    Killed(u32),
    KillFailed(u32),
    SliceElapsed(usize, Duration),
    DidNotShutDown(u32),
}

/// [`RunReporter`] that records every call
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().clone()
    }

    fn push(&self, event: ReportEvent) {
        self.events.lock().push(event);
    }
}

impl RunReporter for RecordingReporter {
    fn shutting_down(&self, process: &ProcessRef) {
        self.push(ReportEvent::ShuttingDown(process.pid()));
    }

    fn signal_failed(&self, process: &ProcessRef, failure: &SignalFailure) {
        self.push(ReportEvent::SignalFailed(process.pid(), failure.clone()));
    }

    fn killed(&self, process: &ProcessRef) {
        self.push(ReportEvent::Killed(process.pid()));
    }

    fn kill_failed(&self, process: &ProcessRef, _reason: &str) {
        self.push(ReportEvent::KillFailed(process.pid()));
    }

    fn slice_elapsed(&self, index: usize, slice: Duration) {
        self.push(ReportEvent::SliceElapsed(index, slice));
    }

    fn did_not_shut_down(&self, process: &ProcessRef) {
        self.push(ReportEvent::DidNotShutDown(process.pid()));
    }
}
