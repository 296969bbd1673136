// Logging and verbosity control

use tracing_subscriber::EnvFilter;

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Configured level only
    Normal = 0,
    /// Debug output
    Verbose = 1,
    /// Trace output
    VeryVerbose = 2,
}

impl VerbosityLevel {
    /// Map a `-v` count to a level
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Normal,
            1 => VerbosityLevel::Verbose,
            _ => VerbosityLevel::VeryVerbose,
        }
    }

    /// Filter directive for this level, `configured` when Normal
    pub fn directive<'a>(&self, configured: &'a str) -> &'a str {
        match self {
            VerbosityLevel::Normal => configured,
            VerbosityLevel::Verbose => "debug",
            VerbosityLevel::VeryVerbose => "trace",
        }
    }
}

/// Initialize tracing on stderr.
///
/// RUST_LOG wins over both the configured level and `-v`.
pub fn init_logging(verbosity: VerbosityLevel, configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive(configured)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
