//! An in-memory sink for tests and short-lived synchronous captures.

use effectus_core::{Logger, LoggingEvent};
use parking_lot::Mutex;

/// Appends every event it sees to a list exposed through a thread-safe
/// accessor. `close()` marks the collector closed; further `log` calls
/// after that are silently dropped, matching the `Logger` contract's
/// "after close, further log calls are silently dropped" rule for the
/// background logger (§4.2).
#[derive(Debug, Default)]
pub struct CollectingLogger {
    events: Mutex<Vec<LoggingEvent>>,
    closed: Mutex<bool>,
}

impl CollectingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every event collected so far.
    pub fn events(&self) -> Vec<LoggingEvent> {
        self.events.lock().clone()
    }

    /// The number of events collected so far.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Logger for CollectingLogger {
    fn log(&self, event: &LoggingEvent) {
        if *self.closed.lock() {
            return;
        }
        self.events.lock().push(event.clone());
    }

    fn close(&self) -> std::io::Result<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effectus_core::{Localized, Severity, Timestamp};
    use std::time::SystemTime;

    fn sample() -> LoggingEvent {
        LoggingEvent {
            message_id: None,
            severity: Severity::Info,
            execution_level: 0,
            process_id: None,
            application_name: "app".to_string(),
            fact: Localized::en("hi"),
            solution: None,
            item_info: None,
            item_position_info: None,
            effectuation_stack: Vec::new(),
            timestamp: Timestamp::new(0, SystemTime::now()),
        }
    }

    #[test]
    fn collects_events_in_order() {
        let logger = CollectingLogger::new();
        logger.log(&sample());
        logger.log(&sample());
        assert_eq!(logger.len(), 2);
    }

    #[test]
    fn drops_events_after_close() {
        let logger = CollectingLogger::new();
        logger.log(&sample());
        logger.close().unwrap();
        logger.log(&sample());
        assert_eq!(logger.len(), 1);
    }

    #[test]
    fn close_is_idempotent() {
        let logger = CollectingLogger::new();
        logger.close().unwrap();
        logger.close().unwrap();
    }
}
