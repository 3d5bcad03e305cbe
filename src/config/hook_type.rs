/**
 * Hook descriptors read from `logger.hooks`, and the typed options of
 * each hook kind.
 */
use config::Value;
use serde::Deserialize;

use super::level_type::{Severity, SyslogPriority};
use super::options::OptionMap;
use crate::error::SetupError;

/**
 * One entry of the `logger.hooks` list.
 *
 * Fields:
 * - `name`: discriminator selecting the hook kind.
 * - `options`: kind-specific settings, expected to be a table.
 */
#[derive(Debug, Clone, Deserialize)]
pub struct HookDescriptor {
    pub name: String,
    #[serde(default)]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookKind {
    Slackrus,
    Syslog,
    /// Any other name; the original text is kept for diagnostics.
    Unrecognized(String),
}

impl HookKind {
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "slackrus" => HookKind::Slackrus,
            "syslog" => HookKind::Syslog,
            _ => HookKind::Unrecognized(name.to_string()),
        }
    }
}

impl HookDescriptor {
    pub fn kind(&self) -> HookKind {
        HookKind::parse(&self.name)
    }

    /**
     * Decodes the `options` field into an option map.
     *
     * A missing or non-table `options` is a shape error. Nested values
     * inside the table are returned separately as type errors so the
     * caller can report them and carry on with the remaining keys.
     *
     * @return The option map and one error per rejected key.
     */
    pub fn option_map(&self) -> Result<(OptionMap, Vec<SetupError>), SetupError> {
        let hook = self.name.to_lowercase();
        let table = self
            .options
            .clone()
            .ok_or_else(|| SetupError::OptionsShape { hook: hook.clone() })?
            .into_table()
            .map_err(|_| SetupError::OptionsShape { hook: hook.clone() })?;

        let options = OptionMap::from_table(table);
        let mismatches = options
            .rejected()
            .iter()
            .map(|key| SetupError::OptionType {
                hook: hook.clone(),
                key: key.clone(),
            })
            .collect();
        Ok((options, mismatches))
    }
}

/**
 * Settings of the team-chat webhook hook.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackOptions {
    pub hook_url: String,
    pub accepted_level: Severity,
    pub channel: String,
    pub icon_emoji: String,
    pub username: String,
}

impl SlackOptions {
    pub fn from_options(options: &OptionMap) -> Self {
        Self {
            hook_url: options.string("hookurl"),
            accepted_level: Severity::parse_or_default(&options.string("acceptedlevels")),
            channel: options.string("channel"),
            icon_emoji: options.string("iconemoji"),
            username: options.string("username"),
        }
    }
}

/**
 * Settings of the system log hook.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogOptions {
    /// Lower-cased transport name: udp, tcp, unix or empty.
    pub protocol: String,
    pub target: String,
    pub priority: SyslogPriority,
    pub tag: String,
}

impl SyslogOptions {
    pub fn from_options(options: &OptionMap) -> Self {
        Self {
            protocol: options.string("protocol").to_lowercase(),
            target: options.string("target"),
            priority: SyslogPriority::from_level_name(&options.string("level")),
            tag: options.string("tag"),
        }
    }
}
