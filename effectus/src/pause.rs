//! The pause/resume primitive (§4.1 `pause`/`proceed`).

use parking_lot::{Condvar, Mutex};

/// A single-slot gate: open by default. `pause` closes it; `proceed`
/// re-opens it and wakes every waiter. Every synchronous step entry calls
/// [`PauseGate::checkpoint`], which blocks while the gate is closed and
/// returns immediately once it is open again; it does not itself close
/// the gate back, so concurrent step entries all pass through once
/// `proceed` is called.
#[derive(Debug)]
pub struct PauseGate {
    open: Mutex<bool>,
    condvar: Condvar,
}

impl PauseGate {
    pub fn new() -> Self {
        PauseGate {
            open: Mutex::new(true),
            condvar: Condvar::new(),
        }
    }

    /// Close the gate: subsequent checkpoints block until [`proceed`] is
    /// called.
    ///
    /// [`proceed`]: PauseGate::proceed
    pub fn pause(&self) {
        *self.open.lock() = false;
    }

    /// Re-open the gate and wake every thread blocked in
    /// [`checkpoint`](PauseGate::checkpoint).
    pub fn proceed(&self) {
        *self.open.lock() = true;
        self.condvar.notify_all();
    }

    /// Block until the gate is open, then return. A no-op if the gate is
    /// already open.
    pub fn checkpoint(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.condvar.wait(&mut open);
        }
    }

    /// Whether the gate is currently open, without blocking.
    pub fn is_open(&self) -> bool {
        *self.open.lock()
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn checkpoint_passes_through_when_open() {
        let gate = PauseGate::new();
        gate.checkpoint();
    }

    #[test]
    fn checkpoint_blocks_until_proceed() {
        let gate = Arc::new(PauseGate::new());
        gate.pause();
        assert!(!gate.is_open());

        let waiter = Arc::clone(&gate);
        let handle = thread::spawn(move || {
            waiter.checkpoint();
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());

        gate.proceed();
        handle.join().unwrap();
    }
}
