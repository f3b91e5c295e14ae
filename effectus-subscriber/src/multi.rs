//! Fans an event out to an ordered list of child sinks (§4.2 "Multi
//! (fan-out) logger").

use effectus_core::{Logger, LoggingEvent};
use std::sync::Arc;

/// Dispatches every event to each child [`Logger`], in list order.
/// `close()` closes every child, propagating the first failure but still
/// attempting the rest.
pub struct MultiLogger {
    children: Vec<Arc<dyn Logger>>,
}

impl std::fmt::Debug for MultiLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiLogger")
            .field("children", &self.children.len())
            .finish()
    }
}

impl MultiLogger {
    pub fn new(children: Vec<Arc<dyn Logger>>) -> Self {
        MultiLogger { children }
    }
}

impl Logger for MultiLogger {
    fn log(&self, event: &LoggingEvent) {
        for child in &self.children {
            child.log(event);
        }
    }

    fn close(&self) -> std::io::Result<()> {
        let mut first_error = None;
        for child in &self.children {
            if let Err(e) = child.close() {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
