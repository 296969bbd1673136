// Console output and the run reporter

use std::io::Write;
use std::time::Duration;

use colored::Colorize;
use softkill_process::{ProcessRef, RunReporter, SignalFailure};

/// Output styling configuration
#[derive(Debug, Clone, Copy)]
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self::stderr()
    }
}

impl OutputStyle {
    /// Style with colors forced on or off
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Colors only when stdout is a terminal
    pub fn stdout() -> Self {
        Self::new(atty::is(atty::Stream::Stdout))
    }

    /// Colors only when stderr is a terminal
    pub fn stderr() -> Self {
        Self::new(atty::is(atty::Stream::Stderr))
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            msg.red().to_string()
        } else {
            msg.to_string()
        }
    }

    /// Format a success notice
    pub fn notice(&self, msg: &str) -> String {
        if self.use_colors {
            msg.green().to_string()
        } else {
            msg.to_string()
        }
    }

    /// Format the progress marker printed after each slice
    pub fn progress(&self) -> String {
        if self.use_colors {
            "...".dimmed().to_string()
        } else {
            "...".to_string()
        }
    }
}

/// Print an error line to stderr.
///
/// The handle is locked for the one line, so color never leaks into other
/// output.
pub fn print_error(style: &OutputStyle, msg: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", style.error(msg));
}

fn print_line(line: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{}", line);
    let _ = stdout.flush();
}

/// Writes run progress to the terminal.
///
/// Notices go to stdout and warnings to stderr, each styled for its own
/// stream.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    out: OutputStyle,
    err: OutputStyle,
}

impl ConsoleReporter {
    /// Same style on both streams
    pub fn new(style: OutputStyle) -> Self {
        Self { out: style, err: style }
    }

    /// Colors decided per stream from terminal detection
    pub fn detect() -> Self {
        Self {
            out: OutputStyle::stdout(),
            err: OutputStyle::stderr(),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::detect()
    }
}

impl RunReporter for ConsoleReporter {
    fn shutting_down(&self, process: &ProcessRef) {
        print_line(&format!("Shutting down {}...", process));
    }

    fn signal_failed(&self, process: &ProcessRef, failure: &SignalFailure) {
        let msg = match failure {
            SignalFailure::NoForegroundWindow => format!("Couldn't find window for {}", process),
            SignalFailure::DeliveryFailed(reason) => {
                format!("Couldn't send Ctrl+C to {}: {}", process, reason)
            }
        };
        print_error(&self.err, &msg);
    }

    fn killed(&self, process: &ProcessRef) {
        print_line(&self.out.notice(&format!("Killed {}", process)));
    }

    fn kill_failed(&self, process: &ProcessRef, reason: &str) {
        print_error(&self.err, &format!("Couldn't kill {}: {}", process, reason));
    }

    fn slice_elapsed(&self, _index: usize, _slice: Duration) {
        print_line(&self.out.progress());
    }

    fn did_not_shut_down(&self, process: &ProcessRef) {
        print_error(&self.err, &format!("{} did not shut down", process));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_style_without_colors() {
        let style = OutputStyle::new(false);
        assert_eq!(style.error("boom"), "boom");
        assert_eq!(style.notice("done"), "done");
        assert_eq!(style.progress(), "...");
    }

    #[test]
    fn test_forced_style_applies_to_both_streams() {
        let reporter = ConsoleReporter::new(OutputStyle::new(false));
        assert!(!reporter.out.use_colors);
        assert!(!reporter.err.use_colors);
    }

    #[test]
    fn test_detection_follows_each_stream() {
        let reporter = ConsoleReporter::detect();
        assert_eq!(reporter.out.use_colors, atty::is(atty::Stream::Stdout));
        assert_eq!(reporter.err.use_colors, atty::is(atty::Stream::Stderr));
    }

    #[test]
    fn test_colored_error_wraps_message() {
        colored::control::set_override(true);
        let style = OutputStyle::new(true);
        let formatted = style.error("boom");
        colored::control::unset_override();
        assert!(formatted.contains("boom"));
        assert_ne!(formatted, "boom");
    }
}
