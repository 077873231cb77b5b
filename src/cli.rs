//! Command-line argument parser and argument access.

use std::time::Duration;

use clap::Parser;

use crate::clap::parse_duration;
use crate::clap::RustBacktrace;

/// Watch a C++ source file, recompiling and rerunning it whenever it changes.
#[derive(Debug, Clone, Parser)]
#[command(version, author, about)]
#[command(max_term_width = 100)]
pub struct Opts {
    /// The source file to watch, e.g. `prog.cpp`.
    ///
    /// The program is compiled to the same path with the last four characters removed, so
    /// `prog.cpp` is compiled to `prog`.
    pub file: Option<String>,

    /// The compiler to invoke. It's called as `COMPILER -o OUTPUT FILE`.
    #[arg(long, env = "SCOUT_COMPILER", default_value = "g++")]
    pub compiler: String,

    /// Options for watching the source file.
    #[command(flatten)]
    pub watch: WatchOpts,

    /// Options to modify logging and error-handling behavior.
    #[command(flatten)]
    pub logging: LoggingOpts,
}

/// Options for watching files.
#[derive(Debug, Clone, clap::Args)]
#[clap(next_help_heading = "File watching options")]
pub struct WatchOpts {
    /// After a change is detected, ignore further changes for this long.
    ///
    /// The rebuild itself isn't delayed; this only collapses bursts of events from a single
    /// save into one rebuild.
    #[arg(long, default_value = "1500ms", value_parser = parse_duration)]
    pub debounce: Duration,

    /// Use polling with the given interval rather than filesystem notifications.
    ///
    /// Polling tends to be more reliable on network filesystems and less performant.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub poll: Option<Duration>,
}

/// Options to modify logging and error-handling behavior.
#[derive(Debug, Clone, clap::Args)]
#[clap(next_help_heading = "Logging options")]
pub struct LoggingOpts {
    #[allow(rustdoc::bare_urls)]
    /// Log filter directives.
    ///
    /// Can be any of "error", "warn", "info", "debug", or "trace". Supports more granular
    /// filtering, as well.
    /// See: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    ///
    /// A nice value for seeing the exact commands run is "scout=debug".
    #[arg(long, default_value = "scout=info")]
    pub log_filter: String,

    /// How to display backtraces in error messages.
    #[arg(long, env = "RUST_BACKTRACE", default_value = "0")]
    pub backtrace: RustBacktrace,
}

impl Opts {
    /// Perform late initialization of the command-line arguments.
    pub fn init(&self) {
        // `miette` reads this to decide whether to capture backtraces.
        std::env::set_var("RUST_BACKTRACE", self.logging.backtrace.to_string());
    }
}
