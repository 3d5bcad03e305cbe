/**
 * The slog drain a configured handle builds into.
 */
use std::{cell::RefCell, io::Write, sync::Arc};

use slog::{error, Drain, Level, Logger, Never, OwnedKVList, Record};

use super::{entry::Entry, FormatContext, Formatter};
use crate::config::level_type::Severity;
use crate::hooks::Hook;

/**
 * Filters by threshold, fires hooks, then writes the formatted record.
 *
 * Delivery failures of any kind go to the error channel and are
 * otherwise ignored. The drain is meant to sit behind a `Mutex`.
 */
pub(crate) struct ConfiguredDrain {
    pub(crate) threshold: Severity,
    pub(crate) formatter: Formatter,
    pub(crate) context: FormatContext,
    pub(crate) sink: RefCell<Box<dyn Write + Send>>,
    pub(crate) hooks: Vec<Arc<dyn Hook>>,
    pub(crate) errors: Logger,
}

impl Drain for ConfiguredDrain {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<(), Never> {
        if !self.threshold.admits(record.level()) {
            return Ok(());
        }
        let entry = Entry::from_record(record, values);

        for hook in &self.hooks {
            if !hook.accepts(entry.level) {
                continue;
            }
            if let Err(e) = hook.fire(&entry) {
                error!(self.errors, "Failed to fire hook"; "hook" => hook.name(), "error" => %e);
            }
        }

        let mut line = Vec::with_capacity(256);
        let written = self
            .formatter
            .format(&mut line, &entry, &self.context)
            .and_then(|_| {
                let mut sink = self.sink.borrow_mut();
                sink.write_all(&line)?;
                sink.flush()
            });
        if let Err(e) = written {
            error!(self.errors, "Failed to write log record"; "error" => %e);
        }
        Ok(())
    }

    fn is_enabled(&self, level: Level) -> bool {
        self.threshold.admits(level)
    }
}
