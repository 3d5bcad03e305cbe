/*!
 * Configures a structured (slog) logger from a hierarchical configuration
 * tree: severity threshold, output sink, formatter, and notification hooks.
 *
 * ```no_run
 * let cfg = logconf::config::load(None).expect("Failed to load configuration");
 * let mut handle = logconf::LoggerHandle::new();
 * logconf::configure(&mut handle, &cfg);
 * let logger = handle.build();
 * slog::info!(logger, "configured");
 * ```
 */
pub mod config;
mod configurator;
pub mod error;
pub mod hooks;
pub mod logging;

pub use configurator::{
    configure, FIELDMAP_KEY, FORMATTER_NAME_KEY, FORMATTER_OPTIONS_KEY, HOOKS_KEY, LEVEL_KEY,
    OUT_NAME_KEY, OUT_OPTIONS_KEY,
};
pub use error::{HookError, SetupError};
pub use logging::LoggerHandle;
