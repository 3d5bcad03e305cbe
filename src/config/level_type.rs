use slog::Level;
use std::fmt;
use thiserror::Error;

/**
 * Severity names accepted by `logger.level` and by the chat hook's
 * `acceptedlevels` option, ordered from least to most severe.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

/// Threshold used whenever a level name is present but not recognized.
pub const DEFAULT_SEVERITY: Severity = Severity::Debug;

/// Raised when a level name does not match any known severity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized level name {0:?}")]
pub struct UnrecognizedLevel(pub String);

impl Severity {
    /**
     * Returns the lower-case name of the severity, as used in configuration.
     */
    pub fn as_str(&self) -> &'static str {
        match *self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Panic => "panic",
        }
    }

    /**
     * Parses a level name, falling back to `DEFAULT_SEVERITY` when the
     * name is not recognized.
     */
    pub fn parse_or_default(s: &str) -> Severity {
        s.parse().unwrap_or(DEFAULT_SEVERITY)
    }

    /**
     * Maps the severity onto the slog level used for filtering.
     *
     * slog has nothing above `Critical`, so fatal and panic share it.
     */
    pub fn as_slog_level(&self) -> Level {
        match *self {
            Severity::Debug => Level::Debug,
            Severity::Info => Level::Info,
            Severity::Warn => Level::Warning,
            Severity::Error => Level::Error,
            Severity::Fatal | Severity::Panic => Level::Critical,
        }
    }

    /**
     * Maps a slog record level back onto a severity. Trace records sit
     * below the lowest threshold and are reported as debug.
     */
    pub fn from_slog_level(level: Level) -> Severity {
        match level {
            Level::Trace | Level::Debug => Severity::Debug,
            Level::Info => Severity::Info,
            Level::Warning => Severity::Warn,
            Level::Error => Severity::Error,
            Level::Critical => Severity::Fatal,
        }
    }

    /**
     * Returns true if a record at `level` passes this threshold.
     */
    pub fn admits(&self, level: Level) -> bool {
        level.is_at_least(self.as_slog_level())
    }
}

impl std::str::FromStr for Severity {
    type Err = UnrecognizedLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            "panic" => Ok(Severity::Panic),
            _ => Err(UnrecognizedLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
 * System log priorities (RFC 5424 severities), most severe first.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyslogPriority {
    Emerg,
    Alert,
    Crit,
    Err,
    Warning,
    Notice,
    Info,
    Debug,
}

/// Priority used when the syslog hook's `level` option is not recognized.
pub const DEFAULT_PRIORITY: SyslogPriority = SyslogPriority::Debug;

impl SyslogPriority {
    /**
     * Numeric severity code; lower is more severe.
     */
    pub fn code(&self) -> u8 {
        match *self {
            SyslogPriority::Emerg => 0,
            SyslogPriority::Alert => 1,
            SyslogPriority::Crit => 2,
            SyslogPriority::Err => 3,
            SyslogPriority::Warning => 4,
            SyslogPriority::Notice => 5,
            SyslogPriority::Info => 6,
            SyslogPriority::Debug => 7,
        }
    }

    /**
     * Maps a level name onto a priority. Unlike `Severity`, the name is
     * matched exactly as given.
     */
    pub fn from_level_name(name: &str) -> SyslogPriority {
        match name.parse::<Severity>() {
            Ok(severity) if severity.as_str() == name => SyslogPriority::from(severity),
            _ => DEFAULT_PRIORITY,
        }
    }

    /**
     * Returns true if a message at `other` is at least as severe as this one.
     */
    pub fn admits(&self, other: SyslogPriority) -> bool {
        other.code() <= self.code()
    }
}

impl From<Severity> for SyslogPriority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => SyslogPriority::Debug,
            Severity::Info => SyslogPriority::Info,
            Severity::Warn => SyslogPriority::Warning,
            Severity::Error => SyslogPriority::Err,
            Severity::Fatal => SyslogPriority::Crit,
            Severity::Panic => SyslogPriority::Emerg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names_any_case() {
        for (name, expected) in [
            ("debug", Severity::Debug),
            ("INFO", Severity::Info),
            ("Warn", Severity::Warn),
            ("eRRor", Severity::Error),
            ("FATAL", Severity::Fatal),
            ("panic", Severity::Panic),
        ] {
            assert_eq!(name.parse::<Severity>(), Ok(expected));
        }
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(
            "warning".parse::<Severity>(),
            Err(UnrecognizedLevel("warning".to_string()))
        );
        assert_eq!(Severity::parse_or_default("garbage"), Severity::Debug);
        assert_eq!(Severity::parse_or_default(""), DEFAULT_SEVERITY);
    }

    #[test]
    fn test_threshold_admits() {
        assert!(Severity::Warn.admits(Level::Error));
        assert!(Severity::Warn.admits(Level::Warning));
        assert!(!Severity::Warn.admits(Level::Info));
        assert!(!Severity::Debug.admits(Level::Trace));
        assert!(Severity::Panic.admits(Level::Critical));
    }

    #[test]
    fn test_priority_table() {
        assert_eq!(SyslogPriority::from_level_name("debug"), SyslogPriority::Debug);
        assert_eq!(SyslogPriority::from_level_name("info"), SyslogPriority::Info);
        assert_eq!(SyslogPriority::from_level_name("warn"), SyslogPriority::Warning);
        assert_eq!(SyslogPriority::from_level_name("error"), SyslogPriority::Err);
        assert_eq!(SyslogPriority::from_level_name("fatal"), SyslogPriority::Crit);
        assert_eq!(SyslogPriority::from_level_name("panic"), SyslogPriority::Emerg);
        assert_eq!(SyslogPriority::from_level_name("ERROR"), DEFAULT_PRIORITY);
        assert_eq!(SyslogPriority::from_level_name("bogus"), DEFAULT_PRIORITY);
    }

    #[test]
    fn test_priority_admits() {
        assert!(SyslogPriority::Err.admits(SyslogPriority::Crit));
        assert!(SyslogPriority::Err.admits(SyslogPriority::Err));
        assert!(!SyslogPriority::Err.admits(SyslogPriority::Warning));
    }
}
