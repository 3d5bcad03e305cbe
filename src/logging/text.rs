/**
 * logfmt-style text formatter.
 *
 * Plain output: `time="2024-03-09T14:05:07+01:00" level=info msg=started port=8080`
 * Colored output: `INFO[0003] started                                      port=8080`
 */
use std::io::{self, Write};

use super::entry::{format_timestamp, level_name, value_text, Entry};
use super::FormatContext;
use crate::config::options::OptionMap;
use slog::Level;

/**
 * Text formatter settings. The zero value is the default formatter.
 *
 * Fields:
 * - `force_colors`: color the output even when the sink is not a terminal.
 * - `disable_colors`: never color the output.
 * - `disable_timestamp`: omit the time.
 * - `full_timestamp`: in colored mode, print the full time instead of seconds elapsed.
 * - `disable_sorting`: keep fields in record order instead of sorting by key.
 * - `quote_empty_fields`: write empty values as `""`.
 * - `timestamp_format`: chrono strftime format, RFC 3339 if unset.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFormatter {
    pub force_colors: bool,
    pub disable_colors: bool,
    pub disable_timestamp: bool,
    pub full_timestamp: bool,
    pub disable_sorting: bool,
    pub quote_empty_fields: bool,
    pub timestamp_format: Option<String>,
}

impl TextFormatter {
    pub fn from_options(options: &OptionMap) -> Self {
        Self {
            force_colors: options.flag("forcecolors"),
            disable_colors: options.flag("disablecolors"),
            disable_timestamp: options.flag("disabletimestamp"),
            full_timestamp: options.flag("fulltimestamp"),
            disable_sorting: options.flag("disablesorting"),
            quote_empty_fields: options.flag("quoteemptyfields"),
            timestamp_format: options
                .get("timestampformat")
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        }
    }

    /**
     * Both color flags set at once. Both are kept; disabling wins.
     */
    pub fn colors_conflict(&self) -> bool {
        self.force_colors && self.disable_colors
    }

    pub fn colored(&self, is_terminal: bool) -> bool {
        (self.force_colors || is_terminal) && !self.disable_colors
    }

    pub fn format(&self, out: &mut Vec<u8>, entry: &Entry, ctx: &FormatContext) -> io::Result<()> {
        let mut fields: Vec<&(String, serde_json::Value)> = entry.fields.iter().collect();
        if !self.disable_sorting {
            fields.sort_by(|a, b| a.0.cmp(&b.0));
        }

        if self.colored(ctx.is_terminal) {
            self.write_colored(out, entry, &fields, ctx)?;
        } else {
            self.write_plain(out, entry, &fields)?;
        }
        out.push(b'\n');
        Ok(())
    }

    fn write_plain(
        &self,
        out: &mut Vec<u8>,
        entry: &Entry,
        fields: &[&(String, serde_json::Value)],
    ) -> io::Result<()> {
        let mut first = true;
        let mut pair = |out: &mut Vec<u8>, key: &str, value: &str| -> io::Result<()> {
            if !first {
                out.push(b' ');
            }
            first = false;
            write!(out, "{}=", key)?;
            self.write_value(out, value)
        };

        if !self.disable_timestamp {
            let time = format_timestamp(&entry.time, self.timestamp_format.as_deref());
            pair(out, "time", &time)?;
        }
        pair(out, "level", level_name(entry.level))?;
        let message = entry.message.trim_end_matches('\n');
        if !message.is_empty() {
            pair(out, "msg", message)?;
        }
        for (key, value) in fields {
            pair(out, key.as_str(), &value_text(value))?;
        }
        Ok(())
    }

    fn write_colored(
        &self,
        out: &mut Vec<u8>,
        entry: &Entry,
        fields: &[&(String, serde_json::Value)],
        ctx: &FormatContext,
    ) -> io::Result<()> {
        let color = level_color(entry.level);
        let tag = level_name(entry.level).to_uppercase();
        let tag = &tag[..tag.len().min(4)];
        let message = entry.message.trim_end_matches('\n');

        if self.disable_timestamp {
            write!(out, "\x1b[{}m{}\x1b[0m {:<44}", color, tag, message)?;
        } else if !self.full_timestamp {
            let elapsed = ctx.started.elapsed().as_secs();
            write!(out, "\x1b[{}m{}\x1b[0m[{:04}] {:<44}", color, tag, elapsed, message)?;
        } else {
            let time = format_timestamp(&entry.time, self.timestamp_format.as_deref());
            write!(out, "\x1b[{}m{}\x1b[0m[{}] {:<44}", color, tag, time, message)?;
        }
        for (key, value) in fields {
            write!(out, " \x1b[{}m{}\x1b[0m=", color, key)?;
            self.write_value(out, &value_text(value))?;
        }
        Ok(())
    }

    fn write_value(&self, out: &mut Vec<u8>, value: &str) -> io::Result<()> {
        if self.needs_quoting(value) {
            write!(out, "{:?}", value)
        } else {
            out.extend_from_slice(value.as_bytes());
            Ok(())
        }
    }

    fn needs_quoting(&self, value: &str) -> bool {
        if value.is_empty() {
            return self.quote_empty_fields;
        }
        !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
    }
}

fn level_color(level: Level) -> u8 {
    match level {
        Level::Trace | Level::Debug => 37,
        Level::Info => 36,
        Level::Warning => 33,
        Level::Error | Level::Critical => 31,
    }
}
