// Run a parsed command line to an exit code

use std::time::Duration;

use softkill_process::{
    Orchestrator, ProcessPlatform, RunReporter, RunResult, ShutdownConfig, SystemPlatform,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::Cli;
use crate::config::{Settings, SettingsLoader};
use crate::error::CliResult;
use crate::logging::{init_logging, VerbosityLevel};
use crate::output::{print_error, ConsoleReporter, OutputStyle};

/// Run the command line against the live system
pub async fn run(cli: Cli) -> i32 {
    if cli.targets.is_empty() {
        eprintln!("{}", Cli::usage());
        return 1;
    }

    let loader = match &cli.config {
        Some(path) => SettingsLoader::with_path(path),
        None => SettingsLoader::new(),
    };
    let settings = match loader.load() {
        Ok(settings) => settings,
        Err(e) => {
            print_error(&OutputStyle::default(), &e.user_message());
            return 1;
        }
    };

    init_logging(VerbosityLevel::from_count(cli.verbose), &settings.log_level);
    let colors = colors_enabled(&cli, &settings);
    debug!(path = %loader.config_path().display(), "settings loaded");

    let platform =
        SystemPlatform::new().with_poll_interval(Duration::from_millis(settings.poll_interval_ms));
    let config = cli.shutdown_config(&settings);

    let cancel = CancellationToken::new();
    let watcher = spawn_interrupt_watcher(cancel.clone());

    let reporter = if colors {
        ConsoleReporter::detect()
    } else {
        ConsoleReporter::new(OutputStyle::new(false))
    };
    let code = match execute(platform, config, &reporter, &cancel).await {
        Ok(result) => result.exit_code(),
        Err(e) => {
            let style = if colors { OutputStyle::stderr() } else { OutputStyle::new(false) };
            print_error(&style, &e.user_message());
            1
        }
    };

    watcher.abort();
    code
}

/// Resolve, signal, wait and escalate with the given platform
pub async fn execute<P: ProcessPlatform>(
    platform: P,
    config: ShutdownConfig,
    reporter: &dyn RunReporter,
    cancel: &CancellationToken,
) -> CliResult<RunResult> {
    let orchestrator = Orchestrator::new(platform, config);
    Ok(orchestrator.run(reporter, cancel).await?)
}

fn colors_enabled(cli: &Cli, settings: &Settings) -> bool {
    if cli.no_color || !settings.color {
        colored::control::set_override(false);
        return false;
    }
    true
}

// Our own Ctrl+C stops the wait instead of killing softkill mid-run.
fn spawn_interrupt_watcher(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling wait");
            cancel.cancel();
        }
    })
}
