/**
 * Applies the `logger.*` configuration tree to a logger handle.
 *
 * Four independent passes (level, output, formatter, hooks), each skipped
 * entirely when its key is absent. Nothing is returned: problems are
 * reported on the handle's error channel and only the affected pass (or
 * hook entry) is abandoned.
 */
use slog::debug;

use crate::config::formatter_type::FormatterKind;
use crate::config::hook_type::{HookDescriptor, HookKind, SlackOptions, SyslogOptions};
use crate::config::level_type::{Severity, DEFAULT_SEVERITY};
use crate::config::options::OptionMap;
use crate::config::output_type::{OutputKind, DEFAULT_LOG_FILE};
use crate::config::ConfigSource;
use crate::error::SetupError;
use crate::hooks::{Hook, SlackHook, SyslogHook};
use crate::logging::{FieldMap, Formatter, JsonFormatter, LoggerHandle, Output, TextFormatter};

pub const LEVEL_KEY: &str = "logger.level";
pub const OUT_NAME_KEY: &str = "logger.out.name";
pub const OUT_OPTIONS_KEY: &str = "logger.out.options";
pub const FORMATTER_NAME_KEY: &str = "logger.formatter.name";
pub const FORMATTER_OPTIONS_KEY: &str = "logger.formatter.options";
pub const FIELDMAP_KEY: &str = "logger.formatter.options.fieldmap";
pub const HOOKS_KEY: &str = "logger.hooks";

/**
 * Configures `logger` from `config`.
 *
 * @param logger The handle to mutate; held exclusively for the call.
 * @param config Read-only view over the configuration tree.
 */
pub fn configure<C: ConfigSource + ?Sized>(logger: &mut LoggerHandle, config: &C) {
    configure_level(logger, config);
    configure_output(logger, config);
    configure_formatter(logger, config);
    configure_hooks(logger, config);
}

fn configure_level<C: ConfigSource + ?Sized>(logger: &mut LoggerHandle, config: &C) {
    if !config.is_set(LEVEL_KEY) {
        return;
    }
    let name = config.string(LEVEL_KEY).unwrap_or_default();
    let level = match name.parse::<Severity>() {
        Ok(level) => level,
        Err(e) => {
            debug!(logger.error_logger(), "Using default level"; "reason" => %e, "level" => %DEFAULT_SEVERITY);
            DEFAULT_SEVERITY
        }
    };
    logger.set_level(level);
}

fn configure_output<C: ConfigSource + ?Sized>(logger: &mut LoggerHandle, config: &C) {
    if !config.is_set(OUT_NAME_KEY) {
        return;
    }
    match OutputKind::parse(&config.string(OUT_NAME_KEY).unwrap_or_default()) {
        OutputKind::Stdout => logger.set_output(Output::Stdout),
        OutputKind::Stderr => logger.set_output(Output::Stderr),
        OutputKind::File => {
            let options = config.string_map(OUT_OPTIONS_KEY).unwrap_or_default();
            let filename = options.get("filename").unwrap_or(DEFAULT_LOG_FILE);
            match Output::open_file(filename) {
                Ok(output) => logger.set_output(output),
                Err(e) => logger.report(&e),
            }
        }
        OutputKind::Unrecognized(name) => {
            debug!(logger.error_logger(), "Ignoring unknown output"; "name" => name);
        }
    }
}

fn configure_formatter<C: ConfigSource + ?Sized>(logger: &mut LoggerHandle, config: &C) {
    if !config.is_set(FORMATTER_NAME_KEY) {
        return;
    }
    let has_options = config.is_set(FORMATTER_OPTIONS_KEY);
    let options = || config.string_map(FORMATTER_OPTIONS_KEY).unwrap_or_default();

    match FormatterKind::parse(&config.string(FORMATTER_NAME_KEY).unwrap_or_default()) {
        FormatterKind::Text => {
            let formatter = if has_options {
                TextFormatter::from_options(&options())
            } else {
                TextFormatter::default()
            };
            if formatter.colors_conflict() {
                logger.report(&SetupError::ColorConflict);
            }
            logger.set_formatter(Formatter::Text(formatter));
        }
        FormatterKind::Json => {
            let formatter = if has_options {
                let mut formatter = JsonFormatter::from_options(&options());
                if let Ok(field_map) = config.string_map(FIELDMAP_KEY) {
                    formatter.field_map = FieldMap::from_options(&field_map);
                }
                formatter
            } else {
                JsonFormatter::default()
            };
            logger.set_formatter(Formatter::Json(formatter));
        }
        FormatterKind::Unrecognized(name) => {
            debug!(logger.error_logger(), "Ignoring unknown formatter"; "name" => name);
        }
    }
}

fn configure_hooks<C: ConfigSource + ?Sized>(logger: &mut LoggerHandle, config: &C) {
    if !config.is_set(HOOKS_KEY) {
        return;
    }
    let descriptors = match config.hooks(HOOKS_KEY) {
        Ok(descriptors) => descriptors,
        Err(e) => {
            logger.report(&SetupError::HookList(e));
            return;
        }
    };

    for descriptor in &descriptors {
        match descriptor.kind() {
            HookKind::Slackrus => register(logger, descriptor, |options| {
                SlackHook::new(SlackOptions::from_options(options))
            }),
            HookKind::Syslog => register(logger, descriptor, |options| {
                SyslogHook::new(SyslogOptions::from_options(options))
            }),
            HookKind::Unrecognized(name) => {
                debug!(logger.error_logger(), "Ignoring unknown hook"; "name" => name);
            }
        }
    }
}

/**
 * Decodes a hook entry's options, builds the hook and registers it.
 * Shape and construction errors skip this entry only.
 */
fn register<H, F>(logger: &mut LoggerHandle, descriptor: &HookDescriptor, build: F)
where
    H: Hook + 'static,
    F: FnOnce(&OptionMap) -> Result<H, SetupError>,
{
    let (options, mismatches) = match descriptor.option_map() {
        Ok(decoded) => decoded,
        Err(e) => {
            logger.report(&e);
            return;
        }
    };
    for mismatch in &mismatches {
        logger.report(mismatch);
    }
    match build(&options) {
        Ok(hook) => logger.add_hook(hook),
        Err(e) => logger.report(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::logging::testing::Captured;
    use crate::logging::MemorySink;
    use ::config::{Config, FileFormat};
    use crate::config::level_type::SyslogPriority;
    use serial_test::serial;
    use slog::{info, Level};
    use std::{env, fs, path::PathBuf};

    fn yaml(text: &str) -> Config {
        config::from_str(text, FileFormat::Yaml).expect("invalid test configuration")
    }

    fn handle(captured: &Captured) -> LoggerHandle {
        LoggerHandle::with_error_logger(captured.logger())
    }

    fn temp_path() -> PathBuf {
        env::temp_dir().join(format!("logconf-{}.log", rand::random::<u64>()))
    }

    #[test]
    fn test_level_names() {
        for (name, expected) in [
            ("debug", Severity::Debug),
            ("Info", Severity::Info),
            ("WARN", Severity::Warn),
            ("error", Severity::Error),
            ("Fatal", Severity::Fatal),
            ("PANIC", Severity::Panic),
        ] {
            let captured = Captured::default();
            let mut logger = handle(&captured);
            configure(&mut logger, &yaml(&format!("logger:\n  level: {name}\n")));
            assert_eq!(logger.level(), expected, "level {name}");
        }
    }

    #[test]
    fn test_unrecognized_level_defaults_to_debug() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        logger.set_level(Severity::Error);
        configure(&mut logger, &yaml("logger:\n  level: verbose\n"));
        assert_eq!(logger.level(), Severity::Debug);
        assert!(captured.errors().is_empty());
    }

    #[test]
    fn test_empty_level_defaults_to_debug() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        logger.set_level(Severity::Error);
        configure(&mut logger, &yaml("logger:\n  level: \"\"\n"));
        assert_eq!(logger.level(), Severity::Debug);
    }

    #[test]
    fn test_absent_keys_leave_handle_untouched() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        logger.set_level(Severity::Error);
        logger.set_output(Output::Stdout);
        configure(&mut logger, &yaml("other:\n  level: info\n"));

        assert_eq!(logger.level(), Severity::Error);
        assert_eq!(logger.output(), &Output::Stdout);
        assert_eq!(logger.formatter(), &Formatter::default());
        assert!(logger.hooks().is_empty());
        assert!(captured.errors().is_empty());
    }

    #[test]
    fn test_output_streams() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(&mut logger, &yaml("logger:\n  out:\n    name: STDOUT\n"));
        assert_eq!(logger.output(), &Output::Stdout);
        configure(&mut logger, &yaml("logger:\n  out:\n    name: stderr\n"));
        assert_eq!(logger.output(), &Output::Stderr);
    }

    #[test]
    fn test_unknown_output_is_ignored() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        logger.set_output(Output::Stdout);
        configure(&mut logger, &yaml("logger:\n  out:\n    name: socket\n"));
        assert_eq!(logger.output(), &Output::Stdout);
        assert!(captured.errors().is_empty());
    }

    #[test]
    fn test_file_output_receives_records() {
        let path = temp_path();
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml(&format!(
                "logger:\n  out:\n    name: file\n    options:\n      filename: '{}'\n  formatter:\n    name: text\n    options:\n      disabletimestamp: true\n",
                path.display()
            )),
        );
        assert!(matches!(logger.output(), Output::File { path: p, .. } if *p == path));

        let log = logger.build();
        info!(log, "to the file");
        assert_eq!(fs::read_to_string(&path).unwrap(), "level=info msg=\"to the file\"\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_output_failure_keeps_sink() {
        let path = temp_path().join("nested").join("x.log");
        let captured = Captured::default();
        let mut logger = handle(&captured);
        logger.set_output(Output::Stdout);
        configure(
            &mut logger,
            &yaml(&format!(
                "logger:\n  out:\n    name: file\n    options:\n      filename: '{}'\n",
                path.display()
            )),
        );
        assert_eq!(logger.output(), &Output::Stdout);
        let errors = captured.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("failed to open log file"));
    }

    #[test]
    fn test_text_formatter_force_colors() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml("logger:\n  formatter:\n    name: Text\n    options:\n      forcecolors: \"true\"\n"),
        );
        assert_eq!(
            logger.formatter(),
            &Formatter::Text(TextFormatter {
                force_colors: true,
                ..TextFormatter::default()
            })
        );
    }

    #[test]
    fn test_text_formatter_all_options() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml(
                "logger:
  formatter:
    name: text
    options:
      disabletimestamp: true
      fulltimestamp: true
      disablesorting: true
      quoteemptyfields: true
      disablecolors: false
      timestampformat: '%H:%M'
      unknown: whatever
",
            ),
        );
        assert_eq!(
            logger.formatter(),
            &Formatter::Text(TextFormatter {
                force_colors: false,
                disable_colors: false,
                disable_timestamp: true,
                full_timestamp: true,
                disable_sorting: true,
                quote_empty_fields: true,
                timestamp_format: Some("%H:%M".to_string()),
            })
        );
    }

    #[test]
    fn test_text_formatter_color_conflict_is_reported() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml("logger:\n  formatter:\n    name: text\n    options:\n      forcecolors: true\n      disablecolors: true\n"),
        );
        assert_eq!(
            captured.errors(),
            vec!["forcecolors and disablecolors can't be true same time".to_string()]
        );
        let Formatter::Text(text) = logger.formatter() else {
            panic!("expected text formatter");
        };
        assert!(text.force_colors && text.disable_colors);
    }

    #[test]
    fn test_formatter_without_options_is_default() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(&mut logger, &yaml("logger:\n  formatter:\n    name: json\n"));
        assert_eq!(logger.formatter(), &Formatter::Json(JsonFormatter::default()));
    }

    #[test]
    fn test_unknown_formatter_is_ignored() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        logger.set_formatter(Formatter::Json(JsonFormatter::default()));
        configure(&mut logger, &yaml("logger:\n  formatter:\n    name: xml\n"));
        assert_eq!(logger.formatter(), &Formatter::Json(JsonFormatter::default()));
    }

    #[test]
    fn test_json_formatter_field_map() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml(
                "logger:
  formatter:
    name: json
    options:
      disabletimestamp: true
      fieldmap:
        fieldkeymsg: message
",
            ),
        );

        let sink = MemorySink::new();
        logger.set_output(sink.output());
        let log = logger.build();
        info!(log, "hello"; "user" => "ann");

        let record: serde_json::Value = serde_json::from_str(sink.contents().trim()).unwrap();
        assert_eq!(record["message"], "hello");
        assert_eq!(record["level"], "info");
        assert_eq!(record["user"], "ann");
        assert!(record.get("msg").is_none());
        assert!(record.get("time").is_none());
        assert!(captured.errors().is_empty());
    }

    #[test]
    fn test_syslog_hook_registered() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml(
                "logger:
  hooks:
    - name: syslog
      options:
        protocol: udp
        target: '127.0.0.1:514'
        level: error
        tag: svc
",
            ),
        );
        assert!(captured.errors().is_empty());
        assert_eq!(logger.hooks().len(), 1);
        let hook = &logger.hooks()[0];
        assert_eq!(hook.name(), "syslog");
        assert!(hook.accepts(Level::Error));
        assert!(!hook.accepts(Level::Warning));
    }

    #[test]
    fn test_syslog_construction_failure_registers_nothing() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml(
                "logger:
  hooks:
    - name: syslog
      options:
        protocol: udp
        target: 'not an address'
        level: error
        tag: svc
",
            ),
        );
        assert!(logger.hooks().is_empty());
        let errors = captured.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("failed to set syslog hook"));
    }

    #[test]
    fn test_hooks_in_order_and_partial_failure_survives() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml(
                "logger:
  hooks:
    - name: SlackRus
      options:
        hookurl: 'https://hooks.example.com/services/T0/B0/X'
        acceptedlevels: warn
        channel: '#ops'
        iconemoji: ':ghost:'
        username: bot
    - name: pagerduty
      options:
        key: abc
    - name: syslog
      options: not-a-map
    - name: syslog
      options:
        protocol: tcp
        target: 'missing-port'
",
            ),
        );
        assert_eq!(logger.hooks().len(), 1);
        let slack = &logger.hooks()[0];
        assert_eq!(slack.name(), "slackrus");
        assert!(slack.accepts(Level::Warning));
        assert!(!slack.accepts(Level::Info));

        let errors = captured.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "unexpected syslog options format");
        assert!(errors[1].starts_with("failed to set syslog hook"));
    }

    #[test]
    fn test_hook_list_decode_failure_only_skips_hooks() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(&mut logger, &yaml("logger:\n  level: warn\n  hooks: 42\n"));
        assert_eq!(logger.level(), Severity::Warn);
        assert!(logger.hooks().is_empty());
        let errors = captured.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("failed to parse hooks settings"));
    }

    #[test]
    fn test_nested_hook_option_is_reported() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml(
                "logger:
  hooks:
    - name: slackrus
      options:
        hookurl: 'https://hooks.example.com/x'
        channel:
          name: ops
",
            ),
        );
        assert_eq!(logger.hooks().len(), 1);
        assert_eq!(
            captured.errors(),
            vec!["slackrus option \"channel\" must be a string".to_string()]
        );
    }

    #[test]
    fn test_absent_hooks_keep_existing() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        logger.add_hook(
            SyslogHook::new(SyslogOptions {
                protocol: "udp".to_string(),
                target: "127.0.0.1:514".to_string(),
                priority: SyslogPriority::Warning,
                tag: "svc".to_string(),
            })
            .unwrap(),
        );
        configure(&mut logger, &yaml("logger:\n  level: info\n"));
        assert_eq!(logger.hooks().len(), 1);
        assert_eq!(logger.hooks()[0].name(), "syslog");
        assert!(logger.hooks()[0].accepts(Level::Warning));
    }

    #[test]
    fn test_panic_threshold_matches_across_hooks() {
        let captured = Captured::default();
        let mut logger = handle(&captured);
        configure(
            &mut logger,
            &yaml(
                "logger:
  hooks:
    - name: slackrus
      options:
        hookurl: 'https://hooks.example.com/x'
        acceptedlevels: panic
    - name: syslog
      options:
        protocol: udp
        target: '127.0.0.1:514'
        level: panic
",
            ),
        );
        assert_eq!(logger.hooks().len(), 2);
        for hook in logger.hooks() {
            assert!(hook.accepts(Level::Critical), "{} rejects critical", hook.name());
            assert!(!hook.accepts(Level::Error), "{} accepts error", hook.name());
        }
    }

    #[test]
    #[serial]
    fn test_file_output_defaults_to_dbutil_log() {
        let previous = env::current_dir().unwrap();
        let dir = env::temp_dir().join(format!("logconf-cwd-{}", rand::random::<u64>()));
        fs::create_dir(&dir).unwrap();
        env::set_current_dir(&dir).unwrap();

        let captured = Captured::default();
        let mut logger = handle(&captured);
        logger.set_formatter(Formatter::Text(TextFormatter {
            disable_timestamp: true,
            ..TextFormatter::default()
        }));
        configure(&mut logger, &yaml("logger:\n  out:\n    name: file\n"));
        info!(logger.build(), "default file");

        env::set_current_dir(&previous).unwrap();
        assert!(matches!(
            logger.output(),
            Output::File { path, .. } if path.as_os_str() == DEFAULT_LOG_FILE
        ));
        assert_eq!(
            fs::read_to_string(dir.join(DEFAULT_LOG_FILE)).unwrap(),
            "level=info msg=\"default file\"\n"
        );
        assert!(captured.errors().is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_idempotent_on_fresh_handles() {
        let path = temp_path();
        let cfg = yaml(&format!(
            "logger:
  level: error
  out:
    name: file
    options:
      filename: '{}'
  formatter:
    name: json
    options:
      timestampformat: '%s'
      fieldmap:
        fieldkeytime: ts
  hooks:
    - name: syslog
      options:
        protocol: udp
        target: '127.0.0.1:514'
        level: warn
        tag: svc
",
            path.display()
        ));

        let captured = Captured::default();
        let mut first = handle(&captured);
        let mut second = handle(&captured);
        configure(&mut first, &cfg);
        configure(&mut second, &cfg);

        assert_eq!(format!("{:?}", first), format!("{:?}", second));
        assert_eq!(first.level(), second.level());
        assert_eq!(first.output(), second.output());
        assert_eq!(first.formatter(), second.formatter());
        assert!(captured.errors().is_empty());
        fs::remove_file(&path).unwrap();
    }
}
