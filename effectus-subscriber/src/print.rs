//! Prints events to stdout/stderr as a human-readable line (§4.2 "Print
//! sink", §6 "Human-readable log line").

use effectus_core::format::{format_line, routes_to_stderr_by_default};
use effectus_core::{Logger, LoggingEvent};
use parking_lot::Mutex;
use std::io::Write;

/// Writes each event to standard output, except that `Error`, `Fatal`,
/// `Loss`, and `Deadly` go to standard error unless `errors_to_standard` is
/// set. Ordered with respect to calls from a single thread: writes go
/// through a single internal lock so interleavings from concurrent callers
/// never split a line.
#[derive(Debug)]
pub struct PrintLogger {
    errors_to_standard: bool,
    step_indentation: bool,
    write_lock: Mutex<()>,
}

impl PrintLogger {
    pub fn new() -> Self {
        PrintLogger {
            errors_to_standard: false,
            step_indentation: true,
            write_lock: Mutex::new(()),
        }
    }

    /// When set, `Error`/`Fatal`/`Loss`/`Deadly` events are written to
    /// standard output instead of standard error.
    pub fn errors_to_standard(mut self, value: bool) -> Self {
        self.errors_to_standard = value;
        self
    }

    /// Whether `Progress`/`Debug`/`Info`/`Iteration` lines are indented by
    /// stack depth.
    pub fn step_indentation(mut self, value: bool) -> Self {
        self.step_indentation = value;
        self
    }
}

impl Default for PrintLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for PrintLogger {
    fn log(&self, event: &LoggingEvent) {
        let line = format_line(event, self.step_indentation);
        let _guard = self.write_lock.lock();
        let to_stderr = routes_to_stderr_by_default(event.severity) && !self.errors_to_standard;
        if to_stderr {
            let _ = writeln!(std::io::stderr(), "{line}");
        } else {
            let _ = writeln!(std::io::stdout(), "{line}");
        }
    }

    fn close(&self) -> std::io::Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_is_idempotent() {
        let logger = PrintLogger::new();
        logger.close().unwrap();
        logger.close().unwrap();
    }
}
