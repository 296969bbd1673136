//! Settings loading
//!
//! Defaults, then an optional TOML file, then `SOFTKILL_*` environment
//! variables. Command-line flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use softkill_process::{DEFAULT_MAX_SLICE_MS, DEFAULT_POLL_INTERVAL_MS};

use crate::error::{CliError, CliResult};

const ENV_PREFIX: &str = "SOFTKILL";

/// User-tunable defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Longest single wait slice
    pub max_slice_ms: u64,
    /// Liveness poll period inside a slice
    pub poll_interval_ms: u64,
    /// Wait budget used when `--timeout` is absent
    pub timeout_ms: Option<u64>,
    /// Kill survivors even without `--kill`
    pub kill: bool,
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
    /// Colored console output
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_slice_ms: DEFAULT_MAX_SLICE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_ms: None,
            kill: false,
            log_level: "warn".to_string(),
            color: true,
        }
    }
}

/// Loads [`Settings`] from file and environment
pub struct SettingsLoader {
    /// Settings file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl SettingsLoader {
    /// Loader for the default settings path
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Loader for a custom settings path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("softkill")
            .join("config.toml")
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate settings. A missing file is not an error.
    pub fn load(&self) -> CliResult<Settings> {
        let config = Config::builder()
            .add_source(
                File::from(self.config_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(&self.env_prefix).try_parsing(true))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        validate(&settings)?;
        Ok(settings)
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject settings that would make the wait loop spin or never progress
pub fn validate(settings: &Settings) -> CliResult<()> {
    if settings.max_slice_ms == 0 {
        return Err(CliError::InvalidArgument {
            message: "max_slice_ms must be greater than 0".to_string(),
        });
    }
    if settings.poll_interval_ms == 0 {
        return Err(CliError::InvalidArgument {
            message: "poll_interval_ms must be greater than 0".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = SettingsLoader::with_path(dir.path().join("absent.toml"));
        assert_eq!(loader.load().unwrap(), Settings::default());
    }

    #[test]
    #[serial]
    fn test_file_values_override_defaults() {
        let file = write_config("max_slice_ms = 1000\ntimeout_ms = 12000\nkill = true\n");
        let settings = SettingsLoader::with_path(file.path()).load().unwrap();
        assert_eq!(settings.max_slice_ms, 1000);
        assert_eq!(settings.timeout_ms, Some(12000));
        assert!(settings.kill);
        assert_eq!(settings.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let file = write_config("poll_interval_ms = 50\n");
        std::env::set_var("SOFTKILL_POLL_INTERVAL_MS", "250");
        let result = SettingsLoader::with_path(file.path()).load();
        std::env::remove_var("SOFTKILL_POLL_INTERVAL_MS");
        assert_eq!(result.unwrap().poll_interval_ms, 250);
    }

    #[test]
    #[serial]
    fn test_zero_slice_rejected() {
        let file = write_config("max_slice_ms = 0\n");
        let err = SettingsLoader::with_path(file.path()).load().unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }
}
