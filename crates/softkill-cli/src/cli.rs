// Command-line surface

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, CommandFactory, Parser};
use softkill_process::{LookupMode, ShutdownConfig};

use crate::config::Settings;

/// Send Ctrl+C to processes, wait for them to exit, optionally kill them
#[derive(Parser, Debug)]
#[command(name = "softkill")]
#[command(bin_name = "softkill")]
#[command(override_usage = "softkill [OPTIONS] process1 [process2 ...]")]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// find process by name (default)
    #[arg(short = 'n', long = "name")]
    pub by_name: bool,

    /// find process by pid
    #[arg(short = 'p', long = "pid")]
    pub by_pid: bool,

    /// maximum amount of time to wait (in milliseconds) for program to exit
    #[arg(short = 't', long = "timeout", value_name = "MS")]
    pub timeout: Option<u64>,

    /// kill after timeout
    #[arg(short = 'k', long = "kill")]
    pub kill: bool,

    /// More log output (-vv for trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Settings file (default: <config dir>/softkill/config.toml)
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// display this help and exit
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Process names, or ids with --pid
    #[arg(value_name = "PROCESS")]
    pub targets: Vec<String>,
}

impl Cli {
    /// Lookup mode; `--pid` wins when both flags are given
    pub fn lookup_mode(&self) -> LookupMode {
        if self.by_pid {
            LookupMode::Pid
        } else {
            LookupMode::Name
        }
    }

    /// Build the run configuration, flags taking precedence over settings
    pub fn shutdown_config(&self, settings: &Settings) -> ShutdownConfig {
        let timeout = self.timeout.or(settings.timeout_ms).map(Duration::from_millis);
        ShutdownConfig::new(self.targets.iter().cloned())
            .lookup(self.lookup_mode())
            .timeout(timeout)
            .kill(self.kill || settings.kill)
            .max_slice(Duration::from_millis(settings.max_slice_ms))
    }

    /// Usage text, as printed for `--help`
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}
