//! Error types for process termination

use std::io;
use thiserror::Error;

/// Process termination errors
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Malformed user input (bad id token, invalid timeout or slice size)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No process with the given id exists
    #[error("Process not found (PID: {pid})")]
    NotFound { pid: u32 },

    /// Resolution produced an empty target set
    #[error("Couldn't find any processes by the supplied criteria")]
    NoTargets,

    /// The graceful interrupt could not be delivered
    #[error("Failed to signal process {pid}: {reason}")]
    SignalDeliveryFailed { pid: u32, reason: String },

    /// Forced termination failed
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// Operation has no implementation on this platform
    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),

    /// Any other failure reported by the process table or OS
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ProcessError {
    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this error aborts the run before any process is touched
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;
