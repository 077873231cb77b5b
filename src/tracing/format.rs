//! Console formatting for log events.
//!
//! Every status line starts with a `[scout]` marker and is colored by level. Messages are wrapped
//! to the terminal width.

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use owo_colors::Style;
use tap::Tap;
use tracing::field::Field;
use tracing::field::Visit;
use tracing::Level;
use tracing::Subscriber;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::FormatFields;
use tracing_subscriber::registry::LookupSpan;

use crate::textwrap::TextWrapOptionsExt;

/// The name shown at the start of every status line.
const PREFIX: &str = "[scout]";

/// A boolean field marking the line announcing a program run, which gets its own color. The
/// field itself isn't shown.
const RUNNING_FIELD: &str = "running";

#[derive(Default)]
pub struct EventFormatter {
    /// Long (multi-line) messages are surrounded by blank lines. This records whether the last
    /// event was long, so two long messages in a row are separated by one blank line, not two.
    last_event_was_long: AtomicBool,
}

impl<S, N> FormatEvent<S, N> for EventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let status = StatusEvent::new(*event.metadata().level())
            .tap_mut(|visitor| event.record(visitor));
        let rendered = status.render(self.last_event_was_long.load(Ordering::SeqCst));
        self.last_event_was_long
            .store(rendered.is_long, Ordering::SeqCst);
        write!(writer, "{}", rendered.text)
    }
}

/// A single log event, collected from its fields.
#[derive(Debug)]
struct StatusEvent {
    style: EventStyle,
    message: String,
    fields: Vec<(String, String)>,
}

struct Rendered {
    text: String,
    is_long: bool,
}

impl StatusEvent {
    fn new(level: Level) -> Self {
        Self {
            style: EventStyle::new(level),
            message: String::new(),
            fields: Vec::new(),
        }
    }

    fn render(&self, last_event_was_long: bool) -> Rendered {
        let marker = self.style.marker();
        let options = crate::textwrap::options()
            .initial_indent(&marker)
            .subsequent_indent(EventStyle::SUBSEQUENT_INDENT);

        let mut message = self.message.clone();
        // One short field goes on the same line as the message; otherwise fields get a line each.
        let inline_fields = self.fields.len() == 1
            && self.fields[0].0.len() + self.fields[0].1.len() + 2
                < options.width.saturating_sub(message.len() + PREFIX.len() + 1);
        if inline_fields {
            for (name, value) in &self.fields {
                message.push(' ');
                message.push_str(&self.style.style_field(name, value));
            }
        }

        // Color before wrapping, or the colored indent resets the color of the first line.
        let styled = self.style.style_message(&message);
        let lines = options.wrap(&styled);
        let is_long = lines.len() > 1;

        let mut text = String::new();
        if is_long && !last_event_was_long {
            text.push('\n');
        }
        for line in &lines {
            text.push_str(line);
            text.push('\n');
        }
        if !inline_fields {
            for (name, value) in &self.fields {
                text.push_str(EventStyle::SUBSEQUENT_INDENT);
                text.push_str(&self.style.style_field(name, value));
                text.push('\n');
            }
        }
        if is_long {
            text.push('\n');
        }

        Rendered { text, is_long }
    }
}

impl Visit for StatusEvent {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_str_or_debug(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_str_or_debug(field, value.to_owned());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == RUNNING_FIELD {
            if value {
                self.style.set_running();
            }
        } else {
            self.record_str_or_debug(field, value.to_string());
        }
    }
}

impl StatusEvent {
    fn record_str_or_debug(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_owned(), value));
        }
    }
}

#[derive(Debug)]
struct EventStyle {
    /// Text after the prefix on the first line, like `DEBUG `.
    level_text: &'static str,
    /// Style for the prefix.
    marker: Style,
    /// Style for the message.
    text: Style,
    /// Style for field names.
    field_name: Style,
}

impl EventStyle {
    const SUBSEQUENT_INDENT: &'static str = "  ";

    fn new(level: Level) -> Self {
        let mut marker = Style::new();
        let mut text = Style::new();
        let mut field_name = Style::new().bold();
        let level_text = match level {
            Level::TRACE => {
                marker = marker.purple();
                text = text.dimmed();
                field_name = field_name.dimmed();
                "TRACE "
            }
            Level::DEBUG => {
                marker = marker.blue();
                text = text.dimmed();
                field_name = field_name.dimmed();
                "DEBUG "
            }
            Level::INFO => {
                marker = marker.green();
                text = text.green();
                ""
            }
            Level::WARN => {
                marker = marker.yellow();
                text = text.yellow();
                ""
            }
            Level::ERROR => {
                marker = marker.red().bold();
                text = text.red();
                "ERROR "
            }
        };

        Self {
            level_text,
            marker,
            text,
            field_name,
        }
    }

    fn set_running(&mut self) {
        self.marker = Style::new().cyan();
        self.text = Style::new().cyan();
    }

    fn marker(&self) -> String {
        format!("{PREFIX} {}", self.level_text)
            .if_supports_color(Stdout, |text| self.marker.style(text))
            .to_string()
    }

    fn style_message(&self, message: &str) -> String {
        message
            .if_supports_color(Stdout, |text| self.text.style(text))
            .to_string()
    }

    fn style_field(&self, name: &str, value: &str) -> String {
        format!(
            "{}={value}",
            name.if_supports_color(Stdout, |text| self.field_name.style(text)),
        )
    }
}
