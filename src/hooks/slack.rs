/**
 * Team-chat alerting through an incoming webhook.
 */
use std::{fmt, time::Duration};

use reqwest::blocking::Client;
use serde_json::{json, Value};
use slog::Level;

use super::Hook;
use crate::config::hook_type::SlackOptions;
use crate::config::level_type::Severity;
use crate::error::{HookError, SetupError};
use crate::logging::entry::{value_text, Entry};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SlackHook {
    options: SlackOptions,
    client: Client,
}

impl SlackHook {
    /**
     * Creates the hook. The webhook URL is mandatory; nothing is sent
     * until a record is delivered.
     */
    pub fn new(options: SlackOptions) -> Result<Self, SetupError> {
        if options.hook_url.is_empty() {
            return Err(SetupError::HookConstruction {
                hook: "slackrus".to_string(),
                reason: "hookurl is required".to_string(),
            });
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SetupError::HookConstruction {
                hook: "slackrus".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { options, client })
    }

    /**
     * Builds the webhook message for a record: one attachment colored by
     * severity, carrying the record fields.
     */
    pub fn payload(&self, entry: &Entry) -> Value {
        let fields: Vec<Value> = entry
            .fields
            .iter()
            .map(|(key, value)| json!({ "title": key, "value": value_text(value), "short": true }))
            .collect();

        let mut payload = json!({
            "attachments": [{
                "color": color(entry.severity()),
                "text": entry.message,
                "fallback": entry.message,
                "fields": fields,
            }],
        });
        for (key, value) in [
            ("channel", &self.options.channel),
            ("icon_emoji", &self.options.icon_emoji),
            ("username", &self.options.username),
        ] {
            if !value.is_empty() {
                payload[key] = Value::String(value.clone());
            }
        }
        payload
    }
}

fn color(severity: Severity) -> &'static str {
    match severity {
        Severity::Debug => "#9B30FF",
        Severity::Info => "good",
        Severity::Warn => "warning",
        Severity::Error | Severity::Fatal | Severity::Panic => "danger",
    }
}

impl Hook for SlackHook {
    fn name(&self) -> &str {
        "slackrus"
    }

    fn accepts(&self, level: Level) -> bool {
        self.options.accepted_level.admits(level)
    }

    fn fire(&self, entry: &Entry) -> Result<(), HookError> {
        self.client
            .post(&self.options.hook_url)
            .json(&self.payload(entry))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

impl fmt::Debug for SlackHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackHook")
            .field("options", &self.options)
            .finish()
    }
}
