/**
 * JSON formatter: one object per line.
 */
use std::io;

use serde_json::{Map, Value};

use super::entry::{format_timestamp, level_name, Entry};
use crate::config::options::OptionMap;

pub const FIELD_KEY_TIME: &str = "time";
pub const FIELD_KEY_LEVEL: &str = "level";
pub const FIELD_KEY_MSG: &str = "msg";

/**
 * Renames for the three standard keys; unset entries keep the default name.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    pub time: Option<String>,
    pub level: Option<String>,
    pub msg: Option<String>,
}

impl FieldMap {
    pub fn from_options(options: &OptionMap) -> Self {
        Self {
            time: options.get("fieldkeytime").map(str::to_string),
            level: options.get("fieldkeylevel").map(str::to_string),
            msg: options.get("fieldkeymsg").map(str::to_string),
        }
    }

    pub fn time_key(&self) -> &str {
        self.time.as_deref().unwrap_or(FIELD_KEY_TIME)
    }

    pub fn level_key(&self) -> &str {
        self.level.as_deref().unwrap_or(FIELD_KEY_LEVEL)
    }

    pub fn msg_key(&self) -> &str {
        self.msg.as_deref().unwrap_or(FIELD_KEY_MSG)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonFormatter {
    pub disable_timestamp: bool,
    pub timestamp_format: Option<String>,
    pub field_map: FieldMap,
}

impl JsonFormatter {
    /**
     * Reads the scalar options. The field map lives in a nested table and
     * is filled in separately.
     */
    pub fn from_options(options: &OptionMap) -> Self {
        Self {
            disable_timestamp: options.flag("disabletimestamp"),
            timestamp_format: options
                .get("timestampformat")
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            field_map: FieldMap::default(),
        }
    }

    pub fn format(&self, out: &mut Vec<u8>, entry: &Entry) -> io::Result<()> {
        let time_key = self.field_map.time_key();
        let level_key = self.field_map.level_key();
        let msg_key = self.field_map.msg_key();

        let mut object = Map::new();
        for (key, value) in &entry.fields {
            // fields named like a standard key would be overwritten
            let key = if key == time_key || key == level_key || key == msg_key {
                format!("fields.{key}")
            } else {
                key.clone()
            };
            object.insert(key, value.clone());
        }

        if !self.disable_timestamp {
            let time = format_timestamp(&entry.time, self.timestamp_format.as_deref());
            object.insert(time_key.to_string(), Value::String(time));
        }
        object.insert(msg_key.to_string(), Value::String(entry.message.clone()));
        object.insert(
            level_key.to_string(),
            Value::String(level_name(entry.level).to_string()),
        );

        serde_json::to_writer(&mut *out, &Value::Object(object))?;
        out.push(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use slog::Level;

    fn entry(fields: Vec<(&str, Value)>) -> Entry {
        Entry {
            time: Local::now(),
            level: Level::Warning,
            message: "disk almost full".to_string(),
            fields: fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    fn render(formatter: &JsonFormatter, entry: &Entry) -> Value {
        let mut out = Vec::new();
        formatter.format(&mut out, entry).unwrap();
        assert_eq!(out.last(), Some(&b'\n'));
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_default_keys() {
        let value = render(&JsonFormatter::default(), &entry(vec![("free", Value::from(3))]));
        assert_eq!(value["msg"], "disk almost full");
        assert_eq!(value["level"], "warning");
        assert_eq!(value["free"], 3);
        assert!(value["time"].is_string());
    }

    #[test]
    fn test_field_map_renames() {
        let options: OptionMap = [("fieldkeymsg", "message"), ("fieldkeylevel", "severity")]
            .into_iter()
            .collect();
        let formatter = JsonFormatter {
            disable_timestamp: true,
            field_map: FieldMap::from_options(&options),
            ..JsonFormatter::default()
        };
        let value = render(&formatter, &entry(vec![]));
        assert_eq!(value["message"], "disk almost full");
        assert_eq!(value["severity"], "warning");
        assert!(value.get("msg").is_none());
        assert!(value.get("time").is_none());
    }

    #[test]
    fn test_clashing_field_is_prefixed() {
        let value = render(
            &JsonFormatter::default(),
            &entry(vec![("msg", Value::from("from field"))]),
        );
        assert_eq!(value["msg"], "disk almost full");
        assert_eq!(value["fields.msg"], "from field");
    }

    #[test]
    fn test_timestamp_format() {
        let options: OptionMap = [("timestampformat", "%Y")].into_iter().collect();
        let formatter = JsonFormatter::from_options(&options);
        let value = render(&formatter, &entry(vec![]));
        assert_eq!(value["time"], Local::now().format("%Y").to_string());
    }
}
