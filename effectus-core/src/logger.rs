//! The logger pipeline contract (§4.2, §6).

use crate::event::LoggingEvent;
use crate::severity::Severity;

/// A sink for [`LoggingEvent`]s.
///
/// `log` is fire-and-forget unless the concrete sink is explicitly
/// synchronous (the crash logger). `close` must be idempotent: a second
/// call is a no-op. Every sink must ensure that events delivered before
/// `close()` returns have been fully processed, which is what lets a
/// background logger's `close()` double as a barrier.
pub trait Logger: Send + Sync {
    /// Deliver `event` to this sink.
    fn log(&self, event: &LoggingEvent);

    /// Flush and release this sink's resources. Idempotent; a second call
    /// must be a no-op rather than an error.
    fn close(&self) -> std::io::Result<()>;
}

/// An optional severity filter a [`Logger`] may implement.
///
/// `Progress` events are opt-in via `log_progress`, independent of the
/// numeric `min_severity` threshold: a sink with `min_severity ==
/// Severity::Warning` and `log_progress == true` still sees `Progress`
/// events even though `Progress < Warning`.
pub trait SeverityFilter {
    /// The minimum severity (other than `Progress`) this sink accepts.
    fn min_severity(&self) -> Severity;

    /// Whether `Progress` events are accepted regardless of
    /// `min_severity`.
    fn log_progress(&self) -> bool;

    /// Whether `event` passes this filter.
    fn accepts(&self, event: &LoggingEvent) -> bool {
        if event.severity == Severity::Progress {
            self.log_progress()
        } else {
            event.severity >= self.min_severity()
        }
    }
}

/// A straightforward [`SeverityFilter`] implementation holding its two
/// settings as plain fields.
#[derive(Copy, Clone, Debug)]
pub struct Filter {
    pub min_severity: Severity,
    pub log_progress: bool,
}

impl Filter {
    pub fn new(min_severity: Severity, log_progress: bool) -> Self {
        Filter {
            min_severity,
            log_progress,
        }
    }
}

impl SeverityFilter for Filter {
    fn min_severity(&self) -> Severity {
        self.min_severity
    }

    fn log_progress(&self) -> bool {
        self.log_progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_gated_independently_of_min_severity() {
        let filter = Filter::new(Severity::Warning, false);
        assert!(!filter.log_progress());
        let filter_with_progress = Filter::new(Severity::Warning, true);
        assert!(filter_with_progress.log_progress());
    }
}
