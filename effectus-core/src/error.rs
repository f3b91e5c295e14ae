//! The workspace's structured error type for non-I/O failure modes.
//!
//! I/O-shaped failures (opening a file, writing to it, POSTing an event)
//! keep using `std::io::Result`/`io::Error` directly, matching
//! `InnerAppender::new`'s `io::Result<Self>` in the teacher crate. This
//! type covers failures that are not naturally an `io::Error`.

use thiserror::Error;

/// A structured failure from somewhere in the Effectus workspace.
#[derive(Debug, Error)]
pub enum Error {
    /// A `log` call (or `close`) arrived after the logger's `close()` had
    /// already completed.
    #[error("logger already closed")]
    LoggerClosed,

    /// An effectuation's canonical text form could not be decoded.
    #[error("not a valid effectuation: {0}")]
    InvalidEffectuation(String),

    /// The worst-severity accumulator (or another shared lock) was
    /// poisoned by a panicking thread.
    #[error("shared execution state was poisoned by a panicking thread")]
    Poisoned,

    /// Wraps an underlying I/O failure from a sink that otherwise reports
    /// through this error type (e.g. a `close()` that flushes several
    /// children and must report a composite result).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A `LoggingEvent` failed to encode to or decode from its JSON wire
    /// format (§6 "Event JSON encoding").
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),
}
