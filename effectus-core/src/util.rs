//! Small utilities shared across the workspace: placeholder substitution,
//! the monotonic time source, and a temporary-directory cleanup helper.

use std::path::Path;
use std::time::{Instant, SystemTime};

/// Substitute `$1..$N` positional placeholders in `text` with `args`
/// (1-based: `$1` is `args[0]`). `$0` is left as a literal, per the open
/// question in the spec's Design Notes, resolved in favor of 1-based
/// placeholders. Absent or out-of-range indices are left intact. The
/// substitution is a single left-to-right pass and never recurses into
/// replacement text.
pub fn substitute(text: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].1 == '$' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].1.is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                let start = chars[i + 1].0;
                let end = chars.get(j).map(|(idx, _)| *idx).unwrap_or(text.len());
                let digits = &text[start..end];
                // Safe: digits is ASCII numeric and non-empty.
                let index: usize = digits.parse().unwrap_or(0);
                if index >= 1 && index <= args.len() {
                    out.push_str(args[index - 1]);
                    i = j;
                    continue;
                }
            }
        }
        out.push(chars[i].1);
        i += 1;
    }
    out
}

/// A monotonic time source, abstracted so tests can stub it out.
///
/// The spec requires `LoggingEvent::timestamp` to be monotonic within one
/// process; [`Instant`] already guarantees that, so the default
/// implementation wraps it directly.
pub trait TimeSource: Send + Sync {
    /// The current instant, per this source's clock.
    fn now(&self) -> Instant;

    /// The current wall-clock time, used only for human-readable and JSON
    /// event timestamps (display, not ordering).
    fn wall_clock_now(&self) -> SystemTime;
}

/// The default [`TimeSource`], backed by [`Instant::now`] and
/// [`SystemTime::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock_now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Nanoseconds elapsed between `start` and `end`. Saturates to zero if `end`
/// precedes `start` (should not happen with a monotonic clock, but guards
/// against a stubbed [`TimeSource`] in tests).
pub fn elapsed_nanos(start: Instant, end: Instant) -> u128 {
    end.checked_duration_since(start)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

/// Recursively removes `dir` and its contents if it exists, ignoring a
/// "not found" error (idempotent cleanup used by step bodies that stage
/// work in a scratch directory).
pub fn cleanup_temp_dir(dir: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
