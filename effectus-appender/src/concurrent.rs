//! The background-threaded logger (§4.2 "Concurrent (background) logger").
//! Grounded on `tracing-appender::inner::InnerAppender`'s single
//! long-lived writer, generalized to an owned worker thread draining a
//! `crossbeam-channel` queue, the crate `tracing-appender` already
//! depends on for exactly this purpose.

use crossbeam_channel::{bounded, unbounded, Sender};
use effectus_core::logger::Filter;
use effectus_core::{Logger, LoggingEvent, SeverityFilter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

enum Command {
    Event(Box<LoggingEvent>),
    Close(Sender<std::io::Result<()>>),
}

/// Owns a single background worker thread and a completion counter.
/// `log(event)` enqueues work and returns immediately; the worker applies
/// the optional [`Filter`] and invokes a user-provided action. `close()`
/// blocks until the queue drains and the user-provided close action has
/// run; after `close()`, further `log` calls are silently dropped.
pub struct ConcurrentLogger {
    sender: Sender<Command>,
    handle: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    completed: Arc<AtomicU64>,
}

impl std::fmt::Debug for ConcurrentLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentLogger")
            .field("completed", &self.completed_count())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

impl ConcurrentLogger {
    /// `action` runs on the background thread for every accepted event.
    /// `close_action` runs once, on the same thread, when `close()` is
    /// called.
    pub fn new<A, C>(action: A, close_action: C) -> Self
    where
        A: Fn(&LoggingEvent) + Send + 'static,
        C: FnOnce() -> std::io::Result<()> + Send + 'static,
    {
        Self::with_filter(None, action, close_action)
    }

    /// Like [`new`](Self::new), but drops events that don't pass `filter`
    /// before they reach `action`.
    pub fn with_filter<A, C>(filter: Option<Filter>, action: A, close_action: C) -> Self
    where
        A: Fn(&LoggingEvent) + Send + 'static,
        C: FnOnce() -> std::io::Result<()> + Send + 'static,
    {
        let (sender, receiver) = unbounded::<Command>();
        let completed = Arc::new(AtomicU64::new(0));
        let completed_worker = Arc::clone(&completed);

        let handle = std::thread::Builder::new()
            .name("effectus-concurrent-logger".to_string())
            .spawn(move || {
                let mut close_action = Some(close_action);
                for command in receiver {
                    match command {
                        Command::Event(event) => {
                            let accepted = filter.map(|f| f.accepts(&event)).unwrap_or(true);
                            if accepted {
                                action(&event);
                            }
                            completed_worker.fetch_add(1, Ordering::SeqCst);
                        }
                        Command::Close(reply) => {
                            let result = close_action.take().map(|f| f()).unwrap_or(Ok(()));
                            let _ = reply.send(result);
                            break;
                        }
                    }
                }
            })
            .expect("failed to spawn effectus-concurrent-logger thread");

        ConcurrentLogger {
            sender,
            handle: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
            completed,
        }
    }

    /// How many events this logger's worker has finished processing
    /// (filtered-out events still count, since they were dequeued).
    pub fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Logger for ConcurrentLogger {
    fn log(&self, event: &LoggingEvent) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        // The channel only closes after `close()` has taken the sender
        // half out of rotation via the closed flag above, so a send
        // failure here can only mean we raced `close()`. Dropping the
        // event in that case matches "after close, further log calls are
        // silently dropped".
        let _ = self.sender.send(Command::Event(Box::new(event.clone())));
    }

    fn close(&self) -> std::io::Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let (reply_tx, reply_rx) = bounded(1);
        let result = if self.sender.send(Command::Close(reply_tx)).is_ok() {
            reply_rx.recv().unwrap_or(Ok(()))
        } else {
            Ok(())
        };
        if let Some(handle) = self.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
        result
    }
}
