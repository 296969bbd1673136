// CLI error types

use softkill_process::ProcessError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl CliError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!("Invalid argument: {}\n\nRun 'softkill --help' for usage information.", message)
            }
            CliError::Config(msg) => {
                format!("Configuration error: {}", msg)
            }
            CliError::Process(ProcessError::InvalidArgument(message)) => {
                format!("Invalid argument: {}\n\nRun 'softkill --help' for usage information.", message)
            }
            CliError::Process(ProcessError::NoTargets) => {
                "Couldn't find any processes by the supplied criteria".to_string()
            }
            CliError::Process(e) => format!("Error: {}", e),
        }
    }
}

impl From<config::ConfigError> for CliError {
    fn from(e: config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_config_variant() {
        let err = CliError::from(config::ConfigError::Message("bad key".to_string()));
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.user_message(), "Configuration error: bad key");
    }

    #[test]
    fn test_io_failures_surface_as_process_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CliError::from(ProcessError::from(io));
        assert!(err.user_message().starts_with("Error: "));
    }
}
