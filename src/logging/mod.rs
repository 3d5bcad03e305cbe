/**
 * The logger handle the configurator mutates, and how it turns into a
 * slog logger.
 *
 * https://docs.rs/slog/latest/slog/
 */
use std::{
    cell::RefCell,
    fmt, io,
    sync::{Arc, Mutex},
    time::Instant,
};

use slog::{error, o, Drain, Level, LevelFilter, Logger};
use slog_async::{Async, AsyncGuard};
use slog_term::FullFormat;

use crate::config::level_type::Severity;
use crate::error::SetupError;
use crate::hooks::Hook;
use drain::ConfiguredDrain;

mod drain;
pub mod entry;
pub mod json;
pub mod output;
pub mod text;

pub use entry::Entry;
pub use json::{FieldMap, JsonFormatter};
pub use output::{MemorySink, Output, SharedWriter};
pub use text::TextFormatter;

/**
 * Per-logger state shared by every record: whether the sink is a
 * terminal, and when the logger was built (for elapsed-time stamps).
 */
#[derive(Debug, Clone, Copy)]
pub struct FormatContext {
    pub is_terminal: bool,
    pub started: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    Text(TextFormatter),
    Json(JsonFormatter),
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Text(TextFormatter::default())
    }
}

impl Formatter {
    pub fn format(&self, out: &mut Vec<u8>, entry: &Entry, ctx: &FormatContext) -> io::Result<()> {
        match self {
            Formatter::Text(text) => text.format(out, entry, ctx),
            Formatter::Json(json) => json.format(out, entry),
        }
    }
}

/**
 * Mutable logger settings: severity threshold, output sink, formatter,
 * and an append-only list of hooks.
 *
 * Setup problems are reported on a separate error channel, which is
 * never affected by the settings above.
 */
pub struct LoggerHandle {
    level: Severity,
    output: Output,
    formatter: Formatter,
    hooks: Vec<Arc<dyn Hook>>,
    errors: Logger,
}

impl LoggerHandle {
    /**
     * Creates a handle at info level writing text to standard error,
     * reporting its own errors through `default_error_logger`.
     */
    pub fn new() -> Self {
        Self::with_error_logger(default_error_logger())
    }

    /**
     * Creates a handle with default settings that reports setup errors
     * to the given logger.
     */
    pub fn with_error_logger(errors: Logger) -> Self {
        Self {
            level: Severity::Info,
            output: Output::default(),
            formatter: Formatter::default(),
            hooks: Vec::new(),
            errors,
        }
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn set_level(&mut self, level: Severity) {
        self.level = level;
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = formatter;
    }

    pub fn hooks(&self) -> &[Arc<dyn Hook>] {
        &self.hooks
    }

    /**
     * Registers a hook. Hooks run in registration order and are never removed.
     */
    pub fn add_hook<H: Hook + 'static>(&mut self, hook: H) {
        self.hooks.push(Arc::new(hook));
    }

    pub fn error_logger(&self) -> &Logger {
        &self.errors
    }

    /**
     * Reports a setup problem on the error channel.
     */
    pub fn report(&self, err: &SetupError) {
        error!(self.errors, "{}", err);
    }

    fn drain(&self) -> ConfiguredDrain {
        ConfiguredDrain {
            threshold: self.level,
            formatter: self.formatter.clone(),
            context: FormatContext {
                is_terminal: self.output.is_terminal(),
                started: Instant::now(),
            },
            sink: RefCell::new(self.output.writer()),
            hooks: self.hooks.clone(),
            errors: self.errors.clone(),
        }
    }

    /**
     * Builds a synchronous logger from the current settings. Later changes
     * to the handle do not affect loggers already built.
     */
    pub fn build(&self) -> Logger {
        Logger::root(Mutex::new(self.drain()).fuse(), o!())
    }

    /**
     * Builds a logger whose records are formatted and delivered on a
     * background thread. Dropping the guard flushes pending records.
     */
    pub fn build_async(&self) -> (Logger, AsyncGuard) {
        let (drain, guard) = Async::new(self.drain()).build_with_guard();
        (Logger::root(Mutex::new(drain.fuse()).fuse(), o!()), guard)
    }
}

impl Default for LoggerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("level", &self.level)
            .field("output", &self.output)
            .field("formatter", &self.formatter)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/**
 * Error channel used when none is given: full-format terminal output on
 * standard error, info and above.
 */
pub fn default_error_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = LevelFilter::new(drain, Level::Info).fuse();
    Logger::root(Mutex::new(drain).fuse(), o!("component" => "logconf"))
}
