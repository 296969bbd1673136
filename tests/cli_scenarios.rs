//! Shutdown runs through the command-line layer
//!
//! Argument parsing and settings merge feed the orchestrator exactly as the
//! binary does, with the console reporter printing progress.

use std::time::Duration;

use clap::Parser;
use softkill_cli::{execute, Cli, ConsoleReporter, OutputStyle, Settings};
use softkill_process::testing::{MockPlatform, MockProcess};
use tokio_util::sync::CancellationToken;

fn two_apps() -> MockPlatform {
    MockPlatform::new()
        .with(MockProcess::new(1, "app").exits_after(Duration::from_millis(1200)))
        .with(MockProcess::new(2, "app").ignores_interrupt())
}

async fn run_args(args: &[&str], settings: &Settings) -> i32 {
    let cli = Cli::try_parse_from(args).unwrap();
    let reporter = ConsoleReporter::new(OutputStyle::new(false));
    execute(
        two_apps(),
        cli.shutdown_config(settings),
        &reporter,
        &CancellationToken::new(),
    )
    .await
    .unwrap()
    .exit_code()
}

#[tokio::test(start_paused = true)]
async fn test_timeout_without_kill_exits_one() {
    let code = run_args(&["softkill", "-t", "6000", "app"], &Settings::default()).await;
    assert_eq!(code, 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_with_kill_exits_zero() {
    let code = run_args(&["softkill", "--timeout=6000", "--kill", "app"], &Settings::default()).await;
    assert_eq!(code, 0);
}

#[tokio::test(start_paused = true)]
async fn test_kill_from_settings_applies_without_flag() {
    let settings = Settings {
        kill: true,
        timeout_ms: Some(2000),
        ..Settings::default()
    };
    let code = run_args(&["softkill", "app"], &settings).await;
    assert_eq!(code, 0);
}
