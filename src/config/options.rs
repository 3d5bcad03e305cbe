/**
 * Flat string-to-string option maps, as read from `*.options` tables.
 */
use std::collections::HashMap;

use config::{Map, Value, ValueKind};

/**
 * Option map with lower-cased keys.
 *
 * Scalar values (strings, booleans, numbers) are kept in their string
 * form. Nested tables and arrays are not options; their keys are kept in
 * `rejected` so the caller can decide whether to report them.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    values: HashMap<String, String>,
    rejected: Vec<String>,
}

impl OptionMap {
    /**
     * Builds an option map from a configuration table.
     */
    pub fn from_table(table: Map<String, Value>) -> Self {
        let mut options = OptionMap::default();
        for (key, value) in table {
            let key = key.to_lowercase();
            match value.kind {
                ValueKind::Table(_) | ValueKind::Array(_) => options.rejected.push(key),
                ValueKind::Nil => {}
                _ => match value.into_string() {
                    Ok(s) => {
                        options.values.insert(key, s);
                    }
                    Err(_) => options.rejected.push(key),
                },
            }
        }
        options.rejected.sort();
        options
    }

    /**
     * Returns the string value of an option, if set.
     */
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /**
     * Returns the value of an option, or an empty string if unset.
     */
    pub fn string(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    /**
     * Boolean options are only enabled by the literal string "true".
     */
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /**
     * Keys whose values were not scalars.
     */
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        OptionMap {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
            rejected: Vec::new(),
        }
    }
}
