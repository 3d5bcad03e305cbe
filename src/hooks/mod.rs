/**
 * Side-channel notifiers run for qualifying log records.
 */
use std::fmt;

use slog::Level;

use crate::error::HookError;
use crate::logging::Entry;

pub mod slack;
pub mod syslog;

pub use self::slack::SlackHook;
pub use self::syslog::SyslogHook;

pub trait Hook: Send + Sync + fmt::Debug {
    /// Short name used when reporting delivery failures.
    fn name(&self) -> &str;

    /// Returns true if records at `level` should be delivered.
    fn accepts(&self, level: Level) -> bool;

    /// Delivers one record. Called only for accepted levels.
    fn fire(&self, entry: &Entry) -> Result<(), HookError>;
}
