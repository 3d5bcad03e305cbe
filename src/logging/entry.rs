/**
 * A slog record flattened into the form formatters and hooks work with.
 */
use std::fmt;

use chrono::{DateTime, Local, SecondsFormat};
use serde_json::Value;
use slog::{Key, Level, OwnedKVList, Record, KV};

use crate::config::level_type::Severity;

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub time: DateTime<Local>,
    pub level: Level,
    pub message: String,
    /// Record fields first, then logger context fields not shadowed by them.
    pub fields: Vec<(String, Value)>,
}

impl Entry {
    pub fn from_record(record: &Record, values: &OwnedKVList) -> Self {
        let mut collector = FieldCollector::default();
        // Serializing into a Vec cannot fail
        let _ = record.kv().serialize(record, &mut collector);
        let own = collector.fields.len();
        let _ = values.serialize(record, &mut collector);

        let mut fields = collector.fields;
        let context = fields.split_off(own);
        for (key, value) in context {
            if !fields.iter().any(|(k, _)| *k == key) {
                fields.push((key, value));
            }
        }

        Self {
            time: Local::now(),
            level: record.level(),
            message: record.msg().to_string(),
            fields,
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_slog_level(self.level)
    }
}

/**
 * Lower-case level name written by the formatters.
 */
pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::Trace => "trace",
        Level::Debug => "debug",
        Level::Info => "info",
        Level::Warning => "warning",
        Level::Error => "error",
        Level::Critical => "fatal",
    }
}

/**
 * Renders a timestamp with a chrono strftime format, falling back to
 * RFC 3339 when no format is given or the format is invalid.
 */
pub fn format_timestamp(time: &DateTime<Local>, format: Option<&str>) -> String {
    if let Some(format) = format {
        let mut out = String::new();
        if fmt::Write::write_fmt(&mut out, format_args!("{}", time.format(format))).is_ok() {
            return out;
        }
    }
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/**
 * Renders a field value the way the text formatter and hooks show it.
 */
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Default)]
struct FieldCollector {
    fields: Vec<(String, Value)>,
}

impl FieldCollector {
    fn push(&mut self, key: Key, value: Value) -> slog::Result {
        self.fields.push((key.to_string(), value));
        Ok(())
    }
}

macro_rules! emit_number {
    ($($method:ident: $t:ty),* $(,)?) => {
        $(
            fn $method(&mut self, key: Key, val: $t) -> slog::Result {
                self.push(key, Value::from(val))
            }
        )*
    };
}

impl slog::Serializer for FieldCollector {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        self.push(key, Value::String(val.to_string()))
    }

    fn emit_str(&mut self, key: Key, val: &str) -> slog::Result {
        self.push(key, Value::String(val.to_string()))
    }

    fn emit_char(&mut self, key: Key, val: char) -> slog::Result {
        self.push(key, Value::String(val.to_string()))
    }

    fn emit_bool(&mut self, key: Key, val: bool) -> slog::Result {
        self.push(key, Value::Bool(val))
    }

    emit_number! {
        emit_usize: usize,
        emit_isize: isize,
        emit_u8: u8,
        emit_i8: i8,
        emit_u16: u16,
        emit_i16: i16,
        emit_u32: u32,
        emit_i32: i32,
        emit_u64: u64,
        emit_i64: i64,
        emit_f32: f32,
        emit_f64: f64,
    }

    fn emit_unit(&mut self, key: Key) -> slog::Result {
        self.push(key, Value::Null)
    }

    fn emit_none(&mut self, key: Key) -> slog::Result {
        self.push(key, Value::Null)
    }
}
