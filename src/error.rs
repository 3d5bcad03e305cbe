/**
 * Error types reported on the logger's error channel.
 *
 * None of these reach the caller of `configure`; they are logged and the
 * affected step (or hook entry) is skipped.
 */
use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to open log file {}: {source}", .path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse hooks settings: {0}")]
    HookList(#[source] config::ConfigError),

    #[error("unexpected {hook} options format")]
    OptionsShape { hook: String },

    #[error("{hook} option {key:?} must be a string")]
    OptionType { hook: String, key: String },

    #[error("failed to set {hook} hook: {reason}")]
    HookConstruction { hook: String, reason: String },

    #[error("forcecolors and disablecolors can't be true same time")]
    ColorConflict,
}

/// Failure to deliver a record through a hook.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("webhook delivery failed: {0}")]
    Webhook(#[from] reqwest::Error),

    #[error("syslog delivery failed: {0}")]
    Syslog(String),
}
