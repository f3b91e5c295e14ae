//! The severity taxonomy used by every [`crate::event::LoggingEvent`].
//!
//! Severities are totally ordered and increase in the order they are
//! declared below. `Fatal` and above mark an execution as
//! [`stopped`](Severity::is_stopping); `Deadly` indicates the whole process
//! cannot continue.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// A single point on the severity scale.
///
/// The ordering is total and is relied upon by the worst-severity
/// accumulator, appease rewriting, and the `stopped` propagation rule: do
/// not reorder these variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Progress,
    Info,
    Iteration,
    Warning,
    Error,
    Fatal,
    Loss,
    Deadly,
}

impl Severity {
    /// All severities, in ascending order.
    pub const ALL: [Severity; 9] = [
        Severity::Debug,
        Severity::Progress,
        Severity::Info,
        Severity::Iteration,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
        Severity::Loss,
        Severity::Deadly,
    ];

    /// `Fatal` and above stop the execution that produced them.
    pub fn is_stopping(self) -> bool {
        self >= Severity::Fatal
    }

    /// Stable, lowercase name used by serialization and the human-readable
    /// log line.
    pub fn name(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Progress => "progress",
            Severity::Info => "info",
            Severity::Iteration => "iteration",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Loss => "loss",
            Severity::Deadly => "deadly",
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }

    fn from_rank(rank: u8) -> Severity {
        Self::ALL[rank as usize]
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A thread-safe, monotonically non-decreasing accumulator of the worst
/// [`Severity`] observed so far in an execution.
///
/// Backed by a single [`AtomicU8`] rather than a mutex: readers never block,
/// and `merge` is a compare-and-swap loop, matching the lock-free style the
/// teacher crate uses for its own callsite interest cache.
#[derive(Debug)]
pub struct WorstSeverity {
    rank: AtomicU8,
}

impl WorstSeverity {
    /// A fresh accumulator, initialized to [`Severity::Info`] per the data
    /// model.
    pub fn new() -> Self {
        WorstSeverity {
            rank: AtomicU8::new(Severity::Info.rank()),
        }
    }

    /// The worst severity observed so far.
    pub fn get(&self) -> Severity {
        Severity::from_rank(self.rank.load(Ordering::Acquire))
    }

    /// Merge `severity` in, keeping the maximum. Returns the resulting
    /// worst severity.
    pub fn merge(&self, severity: Severity) -> Severity {
        let incoming = severity.rank();
        let mut current = self.rank.load(Ordering::Acquire);
        while incoming > current {
            match self.rank.compare_exchange_weak(
                current,
                incoming,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
        self.get()
    }

    /// Whether the execution this accumulator belongs to has reached
    /// `Fatal` or above.
    pub fn is_stopped(&self) -> bool {
        self.get().is_stopping()
    }
}

impl Default for WorstSeverity {
    fn default() -> Self {
        Self::new()
    }
}
