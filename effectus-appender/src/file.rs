//! The file sink, in both its blocking and reopen-per-write policies (§4.2
//! "File sink"). Grounded on
//! `tracing-appender::inner::InnerAppender`'s writer-refresh discipline.

use effectus_core::format::{format_line, sanitize_for_single_line};
use effectus_core::{Logger, LoggingEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// How the file sink holds its handle open between writes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilePolicy {
    /// Keep the file handle open until `close()` (matches
    /// `InnerAppender`'s single long-lived writer).
    Blocking,
    /// Reopen the file, write, and close it again for every event.
    ReopenPerWrite,
}

struct Inner {
    handle: Option<File>,
    seen: HashSet<String>,
}

/// Writes each event as a single sanitized physical line (§6). Deduplicates
/// writes by exact text within its lifetime: an observed line is recorded
/// and suppressed on repetition.
pub struct FileLogger {
    path: PathBuf,
    policy: FilePolicy,
    step_indentation: bool,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogger")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish()
    }
}

impl FileLogger {
    pub fn new(path: impl AsRef<Path>, policy: FilePolicy) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let handle = match policy {
            FilePolicy::Blocking => Some(Self::open(&path)?),
            FilePolicy::ReopenPerWrite => None,
        };
        Ok(FileLogger {
            path,
            policy,
            step_indentation: true,
            inner: Mutex::new(Inner {
                handle,
                seen: HashSet::new(),
            }),
        })
    }

    pub fn step_indentation(mut self, value: bool) -> Self {
        self.step_indentation = value;
        self
    }

    fn open(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }

    /// Write `line` followed by a newline, flushing before returning.
    /// Required so a synchronous crash variant built on top of this sink
    /// can guarantee the write lands before a potential crash.
    fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut inner = self.inner.lock();
        if !inner.seen.insert(line.to_string()) {
            return Ok(());
        }
        match self.policy {
            FilePolicy::Blocking => {
                let handle = inner.handle.get_or_insert(Self::open(&self.path)?);
                writeln!(handle, "{line}")?;
                handle.flush()
            }
            FilePolicy::ReopenPerWrite => {
                let mut handle = Self::open(&self.path)?;
                writeln!(handle, "{line}")?;
                handle.flush()
            }
        }
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LoggingEvent) {
        let rendered = format_line(event, self.step_indentation);
        let sanitized = sanitize_for_single_line(&rendered);
        if let Err(e) = self.write_line(&sanitized) {
            eprintln!("effectus: file sink write failed: {e}");
        }
    }

    fn close(&self) -> std::io::Result<()> {
        let mut inner = self.inner.lock();
        if let Some(mut handle) = inner.handle.take() {
            handle.flush()?;
        }
        Ok(())
    }
}
