//! Shared supervisor state: the logger pipeline, dedup set, and context
//! stacks (§3 "Execution (supervisor) state").

use effectus_core::event::{ItemInfo, ItemPositionInfo, LoggingEvent, Timestamp};
use effectus_core::message::{Language, Message};
use effectus_core::util::{self, TimeSource};
use effectus_core::{Effectuation, Logger, Severity, StepId, WorstSeverity};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::hooks::StepHook;
use crate::pause::PauseGate;

/// Configuration and resources shared between a supervisor and every
/// sibling it `fork`s off via `parallel` (§4.1 `parallel`).
pub(crate) struct Shared {
    pub(crate) application_name: String,
    pub(crate) process_id: Option<u32>,
    pub(crate) item_info: Option<ItemInfo>,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) crash_logger: Option<Arc<dyn Logger>>,
    pub(crate) activated_options: Option<HashSet<String>>,
    pub(crate) dispensed_with: Option<HashSet<String>>,
    pub(crate) before_step_hook: Option<StepHook>,
    pub(crate) after_step_hook: Option<StepHook>,
    pub(crate) operation_count: AtomicU64,
    pub(crate) worst_severity: Arc<WorstSeverity>,
    pub(crate) always_add_crash_info: bool,
    pub(crate) debug: bool,
    pub(crate) attached: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
    pub(crate) time_source: Arc<dyn TimeSource>,
    pub(crate) start: Instant,
}

/// The full mutable state of one supervisor: the shared configuration plus
/// this supervisor's own dedup set, context stacks, and pause gate.
///
/// A `parallel` fork shares [`Shared`] but gets a fresh dedup set, fresh
/// force/appease stacks seeded empty, and its own [`PauseGate`]. The
/// effectuation stack is seeded with a snapshot of the parent's stack at
/// fork time, per §4.1.
pub(crate) struct SupervisorState {
    pub(crate) shared: Arc<Shared>,
    pub(crate) executed_steps: Mutex<HashSet<StepId>>,
    pub(crate) effectuation_stack: Mutex<Vec<Effectuation>>,
    pub(crate) force_stack: Mutex<Vec<bool>>,
    pub(crate) appease_stack: Mutex<Vec<Severity>>,
    pub(crate) pause_gate: PauseGate,
}

impl SupervisorState {
    pub(crate) fn stopped(&self) -> bool {
        self.shared.worst_severity.is_stopped()
    }

    pub(crate) fn stack_snapshot(&self) -> Vec<Effectuation> {
        self.effectuation_stack.lock().clone()
    }

    pub(crate) fn depth(&self) -> usize {
        self.effectuation_stack.lock().len()
    }

    pub(crate) fn push_frame(&self, frame: Effectuation) {
        self.effectuation_stack.lock().push(frame);
    }

    pub(crate) fn pop_frame(&self) {
        self.effectuation_stack.lock().pop();
    }

    pub(crate) fn top_force(&self) -> bool {
        *self.force_stack.lock().last().unwrap_or(&false)
    }

    pub(crate) fn push_force(&self, force: bool) {
        self.force_stack.lock().push(force);
    }

    pub(crate) fn pop_force(&self) {
        self.force_stack.lock().pop();
    }

    pub(crate) fn top_appease(&self) -> Option<Severity> {
        self.appease_stack.lock().last().copied()
    }

    pub(crate) fn push_appease(&self, cap: Severity) {
        self.appease_stack.lock().push(cap);
    }

    pub(crate) fn pop_appease(&self) {
        self.appease_stack.lock().pop();
    }

    pub(crate) fn has_executed(&self, step: &StepId) -> bool {
        self.executed_steps.lock().contains(step)
    }

    pub(crate) fn mark_executed(&self, step: StepId) {
        self.executed_steps.lock().insert(step);
    }

    /// Snapshot the dedup set (for `disremember`).
    pub(crate) fn snapshot_executed(&self) -> HashSet<StepId> {
        self.executed_steps.lock().clone()
    }

    /// Restore the dedup set to a prior snapshot (for `disremember`).
    pub(crate) fn restore_executed(&self, snapshot: HashSet<StepId>) {
        *self.executed_steps.lock() = snapshot;
    }

    pub(crate) fn nanos_since_start(&self) -> u128 {
        util::elapsed_nanos(self.shared.start, self.shared.time_source.now())
    }

    pub(crate) fn timestamp(&self) -> Timestamp {
        Timestamp::new(self.nanos_since_start(), self.shared.time_source.wall_clock_now())
    }

    /// Compose and route a [`LoggingEvent`] per §4.1 `log`.
    pub(crate) fn log(
        &self,
        message: &Message,
        item_position_info: Option<ItemPositionInfo>,
        add_crash_info: bool,
        args: &[&str],
    ) {
        let fact = message.fact.substituted(args);
        let solution = message.solution.as_ref().map(|s| s.substituted(args));
        let event = LoggingEvent {
            message_id: message.id.clone(),
            severity: message.severity,
            execution_level: self.depth(),
            process_id: self.shared.process_id,
            application_name: self.shared.application_name.clone(),
            fact,
            solution,
            item_info: self.shared.item_info.clone(),
            item_position_info,
            effectuation_stack: self.stack_snapshot(),
            timestamp: self.timestamp(),
        };
        self.route(event, add_crash_info);
    }

    /// Emit a framework-internal English-only progress/debug event (step
    /// open/close, optional/dispensable markers, `doing` markers).
    pub(crate) fn log_internal(&self, severity: Severity, fact: String) {
        let mut localized = effectus_core::Localized::new();
        localized.set(Language::En, fact);
        let event = LoggingEvent {
            message_id: None,
            severity,
            execution_level: self.depth(),
            process_id: self.shared.process_id,
            application_name: self.shared.application_name.clone(),
            fact: localized,
            solution: None,
            item_info: self.shared.item_info.clone(),
            item_position_info: None,
            effectuation_stack: self.stack_snapshot(),
            timestamp: self.timestamp(),
        };
        self.route(event, false);
    }

    fn route(&self, event: LoggingEvent, add_crash_info: bool) {
        if add_crash_info || self.shared.always_add_crash_info {
            if let Some(crash) = &self.shared.crash_logger {
                crash.log(&event);
            }
        }
        let appeased = match self.top_appease() {
            Some(cap) if event.severity > cap => event.with_severity(cap),
            _ => event,
        };
        self.shared.logger.log(&appeased);
        self.shared.worst_severity.merge(appeased.severity);
    }

    /// Run the before/after hook pair around a step body (§4.1 "Before/after
    /// hooks"). The operation counter is pre-incremented; if the hook
    /// returns `false` the increment is reverted.
    pub(crate) fn run_before_hook(&self, step: &StepId) -> bool {
        let count = self.shared.operation_count.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.shared.before_step_hook {
            Some(hook) => {
                if hook(count, step) {
                    true
                } else {
                    self.shared.operation_count.fetch_sub(1, Ordering::SeqCst);
                    false
                }
            }
            None => true,
        }
    }

    pub(crate) fn run_after_hook(&self, step: &StepId) {
        if let Some(hook) = &self.shared.after_step_hook {
            let count = self.shared.operation_count.load(Ordering::SeqCst);
            hook(count, step);
        }
    }

    pub(crate) fn is_activated(&self, name: &str) -> bool {
        let activated = self
            .shared
            .activated_options
            .as_ref()
            .map(|set| set.contains(name))
            .unwrap_or(false);
        let dispensed = self
            .shared
            .dispensed_with
            .as_ref()
            .map(|set| set.contains(name))
            .unwrap_or(false);
        activated && !dispensed
    }

    pub(crate) fn is_dispensed(&self, name: &str) -> bool {
        self.shared
            .dispensed_with
            .as_ref()
            .map(|set| set.contains(name))
            .unwrap_or(false)
    }

    /// Fork a sibling state for `parallel`: shares `shared`, gets an
    /// independent dedup set and force/appease stacks, its own pause gate,
    /// and an effectuation stack seeded with a snapshot of this one's.
    pub(crate) fn fork(&self) -> SupervisorState {
        SupervisorState {
            shared: Arc::clone(&self.shared),
            executed_steps: Mutex::new(HashSet::new()),
            effectuation_stack: Mutex::new(self.stack_snapshot()),
            force_stack: Mutex::new(Vec::new()),
            appease_stack: Mutex::new(Vec::new()),
            pause_gate: PauseGate::new(),
        }
    }

    pub(crate) fn attach(&self, key: impl Into<String>, value: Box<dyn Any + Send + Sync>) {
        self.shared.attached.lock().insert(key.into(), value);
    }

    pub(crate) fn attached_is_some(&self, key: &str) -> bool {
        self.shared.attached.lock().contains_key(key)
    }
}
