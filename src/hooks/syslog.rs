/**
 * Forwarding to the system log (RFC 3164).
 */
use std::{fmt, sync::Mutex};

use slog::Level;
use ::syslog::{Facility, Formatter3164, LoggerBackend};

use super::Hook;
use crate::config::hook_type::SyslogOptions;
use crate::config::level_type::{Severity, SyslogPriority};
use crate::error::{HookError, SetupError};
use crate::logging::entry::{value_text, Entry};

type Writer = ::syslog::Logger<LoggerBackend, Formatter3164>;

pub struct SyslogHook {
    options: SyslogOptions,
    writer: Mutex<Writer>,
}

impl SyslogHook {
    /**
     * Connects to the system log.
     *
     * Protocols:
     * - `udp`: sends from an ephemeral local port; the target is resolved now.
     * - `tcp`: connects to the target now.
     * - `unix` or empty: the local syslog socket.
     *
     * @param options Transport, target, minimum priority and tag.
     * @return The hook, or the reason the transport could not be set up.
     */
    pub fn new(options: SyslogOptions) -> Result<Self, SetupError> {
        let formatter = Formatter3164 {
            facility: Facility::LOG_USER,
            hostname: None,
            process: options.tag.clone(),
            pid: std::process::id(),
        };
        let writer = match options.protocol.as_str() {
            "udp" => ::syslog::udp(formatter, "0.0.0.0:0", options.target.as_str()),
            "tcp" => ::syslog::tcp(formatter, options.target.as_str()),
            "" | "unix" => ::syslog::unix(formatter),
            other => {
                return Err(construction_error(format!("unsupported protocol {other:?}")));
            }
        }
        .map_err(|e| construction_error(e.to_string()))?;

        Ok(Self {
            options,
            writer: Mutex::new(writer),
        })
    }

    fn line(entry: &Entry) -> String {
        let mut line = entry.message.trim_end_matches('\n').to_string();
        for (key, value) in &entry.fields {
            line.push_str(&format!(" {}={}", key, value_text(value)));
        }
        line
    }
}

fn construction_error(reason: String) -> SetupError {
    SetupError::HookConstruction {
        hook: "syslog".to_string(),
        reason,
    }
}

fn priority_of(level: Level) -> SyslogPriority {
    SyslogPriority::from(Severity::from_slog_level(level))
}

impl Hook for SyslogHook {
    fn name(&self) -> &str {
        "syslog"
    }

    fn accepts(&self, level: Level) -> bool {
        // slog tops out at Critical, which panic shares with fatal
        let threshold = match self.options.priority {
            SyslogPriority::Emerg | SyslogPriority::Alert => SyslogPriority::Crit,
            priority => priority,
        };
        threshold.admits(priority_of(level))
    }

    fn fire(&self, entry: &Entry) -> Result<(), HookError> {
        let line = Self::line(entry);
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| HookError::Syslog("writer lock poisoned".to_string()))?;
        let sent = match priority_of(entry.level) {
            SyslogPriority::Emerg => writer.emerg(line),
            SyslogPriority::Alert => writer.alert(line),
            SyslogPriority::Crit => writer.crit(line),
            SyslogPriority::Err => writer.err(line),
            SyslogPriority::Warning => writer.warning(line),
            SyslogPriority::Notice => writer.notice(line),
            SyslogPriority::Info => writer.info(line),
            SyslogPriority::Debug => writer.debug(line),
        };
        sent.map_err(|e| HookError::Syslog(e.to_string()))
    }
}

impl fmt::Debug for SyslogHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyslogHook")
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use serde_json::Value;

    fn options(protocol: &str, target: &str) -> SyslogOptions {
        SyslogOptions {
            protocol: protocol.to_string(),
            target: target.to_string(),
            priority: SyslogPriority::Err,
            tag: "svc".to_string(),
        }
    }

    #[test]
    fn test_udp_filters_at_priority() {
        let hook = SyslogHook::new(options("udp", "127.0.0.1:514")).unwrap();
        assert!(hook.accepts(Level::Error));
        assert!(hook.accepts(Level::Critical));
        assert!(!hook.accepts(Level::Warning));
        assert!(!hook.accepts(Level::Debug));
    }

    #[test]
    fn test_panic_priority_accepts_critical() {
        let hook = SyslogHook::new(SyslogOptions {
            priority: SyslogPriority::Emerg,
            ..options("udp", "127.0.0.1:514")
        })
        .unwrap();
        assert!(hook.accepts(Level::Critical));
        assert!(!hook.accepts(Level::Error));
    }

    #[test]
    fn test_unresolvable_target() {
        let err = SyslogHook::new(options("udp", "no port here")).unwrap_err();
        assert!(err.to_string().starts_with("failed to set syslog hook"));
    }

    #[test]
    fn test_unsupported_protocol() {
        let err = SyslogHook::new(options("carrier-pigeon", "coop:1")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to set syslog hook: unsupported protocol \"carrier-pigeon\""
        );
    }

    #[test]
    fn test_line() {
        let entry = Entry {
            time: Local::now(),
            level: Level::Error,
            message: "db down\n".to_string(),
            fields: vec![("retries".to_string(), Value::from(3))],
        };
        assert_eq!(SyslogHook::line(&entry), "db down retries=3");
    }
}
