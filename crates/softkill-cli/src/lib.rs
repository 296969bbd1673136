// softkill command-line library

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use app::{execute, run};
pub use cli::Cli;
pub use config::{Settings, SettingsLoader};
pub use error::{CliError, CliResult};
pub use logging::{init_logging, VerbosityLevel};
pub use output::{ConsoleReporter, OutputStyle};
