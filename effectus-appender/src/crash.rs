//! The synchronous crash logger (§4.2 "Crash logger"). A single-threaded
//! synchronous variant of [`crate::concurrent::ConcurrentLogger`]: `log`
//! blocks until the user action has run and flushed, so an event
//! submitted before a crash is guaranteed to be on disk by the time
//! `log` returns.

use effectus_core::{Logger, LoggingEvent};
use parking_lot::Mutex;

type Action = Box<dyn Fn(&LoggingEvent) -> std::io::Result<()> + Send + Sync>;
type CloseAction = Box<dyn FnOnce() -> std::io::Result<()> + Send>;

/// Runs a user-provided action synchronously on the calling thread for
/// every event: no queue, no background worker. `close()` runs the
/// user-provided close action exactly once.
pub struct CrashLogger {
    action: Action,
    close_action: Mutex<Option<CloseAction>>,
}

impl std::fmt::Debug for CrashLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrashLogger").finish()
    }
}

impl CrashLogger {
    pub fn new<A, C>(action: A, close_action: C) -> Self
    where
        A: Fn(&LoggingEvent) -> std::io::Result<()> + Send + Sync + 'static,
        C: FnOnce() -> std::io::Result<()> + Send + 'static,
    {
        CrashLogger {
            action: Box::new(action),
            close_action: Mutex::new(Some(Box::new(close_action))),
        }
    }
}

impl Logger for CrashLogger {
    fn log(&self, event: &LoggingEvent) {
        if let Err(e) = (self.action)(event) {
            eprintln!("effectus: crash logger write failed: {e}");
        }
    }

    fn close(&self) -> std::io::Result<()> {
        let action = self.close_action.lock().take();
        match action {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}
