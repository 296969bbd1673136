//! # softkill-process
//!
//! **Purpose**: Graceful, time-bounded termination of running processes
//!
//! Resolves target processes by name or id, asks each to shut down with a
//! console interrupt, waits for them in bounded slices, and optionally kills
//! whatever is left when the budget runs out.
//!
//! ## Features
//!
//! - **Resolution**: by name (all matches) or by id (exactly one each)
//! - **Graceful Interrupt**: routed through the process or its parent's
//!   foreground surface
//! - **Sliced Waiting**: concurrent per-process waits, joined per slice
//! - **Escalation**: optional forced termination of survivors
//! - **Cancellation**: waits stop promptly on a `CancellationToken`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use softkill_process::{Orchestrator, ShutdownConfig, SilentReporter, SystemPlatform};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ShutdownConfig::new(["vim"]).timeout_ms(10_000).kill(true);
//! let orchestrator = Orchestrator::new(SystemPlatform::new(), config);
//!
//! let result = orchestrator
//!     .run(&SilentReporter, &CancellationToken::new())
//!     .await?;
//! std::process::exit(result.exit_code());
//! # }
//! ```

pub mod budget;
pub mod config;
pub mod error;
pub mod escalation;
pub mod initiator;
pub mod orchestrator;
pub mod platform;
pub mod report;
pub mod resolver;
pub mod scheduler;
pub mod system;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use budget::{Slices, TimeBudget};
pub use config::{ShutdownConfig, DEFAULT_MAX_SLICE_MS};
pub use error::{ProcessError, Result};
pub use escalation::{Escalation, EscalationHandler, EscalationReason, FailureKind, RunFailure};
pub use initiator::{Initiation, ShutdownInitiator, ShutdownOutcome, SignalFailure};
pub use orchestrator::{Orchestrator, RunResult};
pub use platform::{ProcessPlatform, ProcessRef};
pub use report::{RunReporter, SilentReporter};
pub use resolver::{LookupMode, ProcessResolver, TargetSet};
pub use scheduler::{WaitOutcome, WaitReport, WaitScheduler};
pub use system::{SystemPlatform, DEFAULT_POLL_INTERVAL_MS};
