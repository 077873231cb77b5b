//! Adapter for parsing the `$RUST_BACKTRACE` environment variable with a
//! [`clap::builder::Arg::value_parser`].

use std::fmt::Display;

use clap::builder::PossibleValue;

/// Whether to display backtraces in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RustBacktrace {
    /// Hide backtraces in errors.
    Off,
    /// Display backtraces in errors.
    On,
    /// Display abbreviated backtraces in errors.
    Short,
    /// Display full backtraces in errors, including less-useful stack frames.
    Full,
}

impl clap::ValueEnum for RustBacktrace {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Off, Self::On, Self::Short, Self::Full]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            RustBacktrace::Off => PossibleValue::new("0").help("Hide backtraces in errors"),
            RustBacktrace::On => PossibleValue::new("1").help("Display backtraces in errors"),
            RustBacktrace::Short => {
                PossibleValue::new("short").help("Display abbreviated backtraces in errors")
            }
            RustBacktrace::Full => PossibleValue::new("full")
                .help("Display backtraces with all stack frames in errors"),
        })
    }
}

impl Display for RustBacktrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RustBacktrace::Off => write!(f, "0"),
            RustBacktrace::On => write!(f, "1"),
            RustBacktrace::Short => write!(f, "short"),
            RustBacktrace::Full => write!(f, "full"),
        }
    }
}
