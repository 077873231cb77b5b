//! Errors that `scout` reports to the user.
//!
//! [`MissingArgument`] and [`WatchSubscriptionFailure`] are fatal at startup. A [`SpawnFailure`]
//! only ends the current pipeline run; the watcher keeps waiting for the next change.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use notify_debouncer_full::notify;
use thiserror::Error;

/// No source file was given on the command line.
#[derive(Debug, Error, Diagnostic)]
#[error("No filename passed, exiting")]
#[diagnostic(help("Pass the file to watch, like `scout prog.cpp`"))]
pub struct MissingArgument;

/// The source file couldn't be watched, most often because it doesn't exist.
#[derive(Debug, Error, Diagnostic)]
#[error("Failed to watch `{path}`")]
pub struct WatchSubscriptionFailure {
    /// The file we tried to watch.
    pub path: Utf8PathBuf,
    /// Why watching failed.
    #[source]
    pub source: notify::Error,
}

/// The compiler or the compiled program couldn't be started at all.
#[derive(Debug, Error, Diagnostic)]
#[error("Failed to start `{command}`")]
pub struct SpawnFailure {
    /// The command, quoted for display.
    pub command: String,
    /// Why the process couldn't be started.
    #[source]
    pub source: std::io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_spawn_failure_display() {
        let err = SpawnFailure {
            command: "./prog".to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "Failed to start `./prog`");
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("entity not found".to_owned())
        );
    }

    #[test]
    fn test_missing_argument_help() {
        let help = MissingArgument.help().map(|help| help.to_string());
        assert_eq!(
            help.as_deref(),
            Some("Pass the file to watch, like `scout prog.cpp`")
        );
    }
}
