//! Parsing [`Duration`]s like `1500ms` or `2s` for [`clap::builder::Arg::value_parser`].

use std::time::Duration;

use humantime::DurationError;

/// Parse a human-readable duration, with a hint about what went wrong if it can't be parsed.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value).map_err(|err| {
        let hint = match &err {
            DurationError::InvalidCharacter(_) => {
                "non-alphanumeric characters are prohibited".to_owned()
            }
            DurationError::NumberExpected(_) => {
                "did you split a unit into multiple words?".to_owned()
            }
            DurationError::UnknownUnit { unit, .. } => {
                format!("unknown unit `{unit}`; valid units include `ms` and `s`")
            }
            DurationError::NumberOverflow => "duration is too long".to_owned(),
            DurationError::Empty => "no duration given".to_owned(),
        };
        format!("{err}: {hint}")
    })
}
