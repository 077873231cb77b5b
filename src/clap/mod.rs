//! Adapters for parsing [`clap`] arguments to various types.

mod humantime;
mod rust_backtrace;

pub use rust_backtrace::RustBacktrace;

pub use self::humantime::parse_duration;
