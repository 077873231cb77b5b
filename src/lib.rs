//! `scout` watches a single C++ source file and, whenever it changes, recompiles it and runs the
//! resulting program, relaying the output of both the compiler and the program to the console.
//!
//! The whole tool is one control loop: [`WatchTarget::resolve`] turns the command-line argument
//! into a source path and an output path, then [`run_watcher`] waits for changes and drives a
//! [`Pipeline`] run for each accepted change.
//!
//! Note that the `scout` Rust library is a convenience for the binary and its tests; it is not a
//! stable API.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod clap;
pub mod cli;
mod command_ext;
mod debounce;
mod error;
mod event_filter;
mod pipeline;
mod target;
mod textwrap;
mod tracing;
mod watcher;

pub(crate) use command_ext::CommandExt;

pub use debounce::Debounce;
pub use debounce::DEFAULT_DEBOUNCE;
pub use error::MissingArgument;
pub use error::SpawnFailure;
pub use error::WatchSubscriptionFailure;
pub use pipeline::Pipeline;
pub use pipeline::PipelineRun;
pub use pipeline::ProcessResult;
pub use pipeline::ReportLine;
pub use target::WatchTarget;
pub use self::tracing::install_tracing;
pub use watcher::run_watcher;
pub use watcher::WatcherOpts;
