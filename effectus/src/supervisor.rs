//! The synchronous execution supervisor and its builder.

use effectus_core::event::{ItemInfo, ItemPositionInfo};
use effectus_core::message::Message;
use effectus_core::util::{SystemTimeSource, TimeSource};
use effectus_core::{Effectuation, Logger, Severity, StepId, WorstSeverity};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

use crate::hooks::StepHook;
use crate::state::{Shared, SupervisorState};

/// Builds a [`Supervisor`] (mirrors `tracing_subscriber`'s `fmt()` builder
/// chain rather than one large constructor argument list).
pub struct SupervisorBuilder {
    application_name: String,
    process_id: Option<u32>,
    item_info: Option<ItemInfo>,
    logger: Option<Arc<dyn Logger>>,
    crash_logger: Option<Arc<dyn Logger>>,
    activated_options: Option<HashSet<String>>,
    dispensed_with: Option<HashSet<String>>,
    before_step_hook: Option<StepHook>,
    after_step_hook: Option<StepHook>,
    always_add_crash_info: bool,
    debug: bool,
    time_source: Arc<dyn TimeSource>,
}

impl std::fmt::Debug for SupervisorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupervisorBuilder")
            .field("application_name", &self.application_name)
            .field("process_id", &self.process_id)
            .finish()
    }
}

impl SupervisorBuilder {
    pub fn new(application_name: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        SupervisorBuilder {
            application_name: application_name.into(),
            process_id: Some(std::process::id()),
            item_info: None,
            logger: Some(logger),
            crash_logger: None,
            activated_options: None,
            dispensed_with: None,
            before_step_hook: None,
            after_step_hook: None,
            always_add_crash_info: false,
            debug: false,
            time_source: Arc::new(SystemTimeSource),
        }
    }

    pub fn process_id(mut self, process_id: Option<u32>) -> Self {
        self.process_id = process_id;
        self
    }

    pub fn item_info(mut self, item_info: impl Into<ItemInfo>) -> Self {
        self.item_info = Some(item_info.into());
        self
    }

    pub fn crash_logger(mut self, crash_logger: Arc<dyn Logger>) -> Self {
        self.crash_logger = Some(crash_logger);
        self
    }

    pub fn activated_options(mut self, options: HashSet<String>) -> Self {
        self.activated_options = Some(options);
        self
    }

    pub fn dispensed_with(mut self, names: HashSet<String>) -> Self {
        self.dispensed_with = Some(names);
        self
    }

    pub fn before_step_hook(mut self, hook: StepHook) -> Self {
        self.before_step_hook = Some(hook);
        self
    }

    pub fn after_step_hook(mut self, hook: StepHook) -> Self {
        self.after_step_hook = Some(hook);
        self
    }

    pub fn always_add_crash_info(mut self, value: bool) -> Self {
        self.always_add_crash_info = value;
        self
    }

    pub fn debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    #[cfg(test)]
    pub(crate) fn time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn build(self) -> Supervisor {
        let shared = Arc::new(Shared {
            application_name: self.application_name,
            process_id: self.process_id,
            item_info: self.item_info,
            logger: self.logger.expect("a logger is required"),
            crash_logger: self.crash_logger,
            activated_options: self.activated_options,
            dispensed_with: self.dispensed_with,
            before_step_hook: self.before_step_hook,
            after_step_hook: self.after_step_hook,
            operation_count: AtomicU64::new(0),
            worst_severity: Arc::new(WorstSeverity::new()),
            always_add_crash_info: self.always_add_crash_info,
            debug: self.debug,
            attached: Mutex::new(HashMap::new()),
            time_source: self.time_source,
            start: Instant::now(),
        });
        Supervisor {
            state: Arc::new(SupervisorState {
                shared,
                executed_steps: Mutex::new(HashSet::new()),
                effectuation_stack: Mutex::new(Vec::new()),
                force_stack: Mutex::new(Vec::new()),
                appease_stack: Mutex::new(Vec::new()),
                pause_gate: crate::pause::PauseGate::new(),
            }),
        }
    }
}

/// Drops a stack frame (and, for steps, the force frame alongside it) even
/// if the body it wraps panics, so the invariant "every push has a
/// matching pop on every exit path" holds unconditionally.
struct FrameGuard<'s> {
    state: &'s SupervisorState,
    pop_force: bool,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if self.pop_force {
            self.state.pop_force();
        }
        self.state.pop_frame();
    }
}

struct AppeaseGuard<'s> {
    state: &'s SupervisorState,
}

impl Drop for AppeaseGuard<'_> {
    fn drop(&mut self) {
        self.state.pop_appease();
    }
}

struct DisrememberGuard<'s> {
    state: &'s SupervisorState,
    snapshot: Option<HashSet<StepId>>,
}

impl Drop for DisrememberGuard<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.state.restore_executed(snapshot);
        }
    }
}

/// The synchronous execution supervisor for one work item.
///
/// Cheap to clone: internally an `Arc` over the shared state, so the same
/// supervisor handle can be held by the caller and by
/// [`crate::asupervisor::AsyncSupervisor`] without cloning its stacks.
#[derive(Clone)]
pub struct Supervisor {
    pub(crate) state: Arc<SupervisorState>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("application_name", &self.state.shared.application_name)
            .field("stopped", &self.state.stopped())
            .field("depth", &self.state.depth())
            .finish()
    }
}

impl Supervisor {
    /// Run `body` as a step, deduplicated by `step`'s identity (§4.1
    /// `effectuate`).
    pub fn effectuate<R>(&self, step: StepId, body: impl FnOnce() -> R) -> Option<R> {
        if self.state.stopped() {
            self.state
                .log_internal(Severity::Debug, format!("SKIPPING STEP {step} (execution stopped)"));
            return None;
        }
        if self.state.has_executed(&step) && !self.state.top_force() {
            if self.state.shared.debug {
                self.state.log_internal(
                    Severity::Debug,
                    format!("SKIPPING STEP {step} (already executed)"),
                );
            }
            return None;
        }

        self.state.pause_gate.checkpoint();
        self.state
            .log_internal(Severity::Progress, format!(">> STEP {step}"));

        self.state.push_frame(Effectuation::Step(step.clone()));
        self.state.push_force(false);
        self.state.mark_executed(step.clone());
        let guard = FrameGuard {
            state: &self.state,
            pop_force: true,
        };

        self.state.run_before_hook(&step);
        let start = Instant::now();
        let result = body();
        let elapsed = start.elapsed();
        drop(guard);
        self.state.run_after_hook(&step);

        let verb = if self.state.stopped() {
            "ABORDED"
        } else {
            "DONE"
        };
        self.state.log_internal(
            Severity::Progress,
            format!("<< {verb} STEP {step} (duration: {:.3} seconds)", elapsed.as_secs_f64()),
        );
        Some(result)
    }

    /// Run `body` with the dedup check bypassed for its direct `effectuate`
    /// children only (§4.1 `force`).
    pub fn force<R>(&self, body: impl FnOnce() -> R) -> R {
        self.state.push_force(true);
        let guard = ForceOnlyGuard { state: &self.state };
        let result = body();
        drop(guard);
        result
    }

    /// Like [`force`](Supervisor::force), but propagates the *current* top
    /// of the force stack instead of unconditionally forcing (§4.1
    /// `inheritForced`).
    pub fn inherit_forced<R>(&self, body: impl FnOnce() -> R) -> R {
        let inherited = self.state.top_force();
        self.state.push_force(inherited);
        let guard = ForceOnlyGuard { state: &self.state };
        let result = body();
        drop(guard);
        result
    }

    /// Run `body`, then forget any steps that executed inside it, so they
    /// may run again outside (§4.1 `disremember`).
    pub fn disremember<R>(&self, body: impl FnOnce() -> R) -> R {
        let mut guard = DisrememberGuard {
            state: &self.state,
            snapshot: Some(self.state.snapshot_executed()),
        };
        let result = body();
        if let Some(snapshot) = guard.snapshot.take() {
            self.state.restore_executed(snapshot);
        }
        result
    }

    /// Run `body` only if `name` is activated and not dispensed with
    /// (§4.1 `optional`).
    pub fn optional<R>(&self, name: impl Into<String>, body: impl FnOnce() -> R) -> Option<R> {
        let name = name.into();
        if !self.state.is_activated(&name) {
            self.state.log_internal(
                Severity::Progress,
                format!("OPTIONAL PART \"{name}\" NOT ACTIVATED"),
            );
            return None;
        }
        self.state
            .log_internal(Severity::Progress, format!(">> START OPTIONAL PART \"{name}\""));
        self.state.push_frame(Effectuation::OptionalPart(name.clone()));
        let guard = FrameGuard {
            state: &self.state,
            pop_force: false,
        };
        let result = body();
        drop(guard);
        self.state
            .log_internal(Severity::Progress, format!("<< DONE OPTIONAL PART \"{name}\""));
        Some(result)
    }

    /// Run `body` unless `name` has been dispensed with (§4.1
    /// `dispensable`).
    pub fn dispensable<R>(&self, name: impl Into<String>, body: impl FnOnce() -> R) -> Option<R> {
        let name = name.into();
        if self.state.is_dispensed(&name) {
            self.state
                .log_internal(Severity::Progress, format!("DISPENSABLE PART \"{name}\" DEACTIVATED"));
            return None;
        }
        self.state
            .log_internal(Severity::Progress, format!(">> START DISPENSABLE PART \"{name}\""));
        self.state.push_frame(Effectuation::DispensablePart(name.clone()));
        let guard = FrameGuard {
            state: &self.state,
            pop_force: false,
        };
        let result = body();
        drop(guard);
        self.state
            .log_internal(Severity::Progress, format!("<< DONE DISPENSABLE PART \"{name}\""));
        Some(result)
    }

    /// Whether `name` is a dispensable part that would currently run,
    /// without running any body (§4.1 `dispensableIsActive`).
    pub fn dispensable_is_active(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        let active = !self.state.is_dispensed(&name);
        if active {
            self.state
                .log_internal(Severity::Progress, format!("DISPENSABLE PART \"{name}\" IS ACTIVE"));
        } else {
            self.state
                .log_internal(Severity::Progress, format!("DISPENSABLE PART \"{name}\" DEACTIVATED"));
        }
        active
    }

    /// Run `body` while capping every event logged through this supervisor
    /// at `severity`, on its way to the main logger only (§4.1 `appease`).
    pub fn appease<R>(&self, severity: Severity, body: impl FnOnce() -> R) -> R {
        self.state.push_appease(severity);
        let guard = AppeaseGuard { state: &self.state };
        let result = body();
        drop(guard);
        result
    }

    /// [`appease`](Supervisor::appease) with the default cap of
    /// [`Severity::Error`].
    pub fn appease_default<R>(&self, body: impl FnOnce() -> R) -> R {
        self.appease(Severity::Error, body)
    }

    /// Run `body` inside a named, undedupable described region, bracketed
    /// by `START DOING`/`DONE DOING` progress events (§4.1 `doing`).
    pub fn doing<R>(&self, description: impl Into<String>, body: impl FnOnce() -> R) -> R {
        let description = description.into();
        self.state
            .log_internal(Severity::Progress, format!("START DOING {description}"));
        self.state.push_frame(Effectuation::DescribedPart(description.clone()));
        let guard = FrameGuard {
            state: &self.state,
            pop_force: false,
        };
        let result = body();
        drop(guard);
        self.state
            .log_internal(Severity::Progress, format!("DONE DOING {description}"));
        result
    }

    /// Compose and route a [`effectus_core::LoggingEvent`] from `message`
    /// and `args` through the logger pipeline (§4.1 `log`).
    pub fn log(
        &self,
        message: &Message,
        item_position_info: Option<ItemPositionInfo>,
        add_crash_info: bool,
        args: &[&str],
    ) {
        self.state.log(message, item_position_info, add_crash_info, args);
    }

    /// Close the gate: subsequent step entries block until
    /// [`proceed`](Supervisor::proceed) is called (§4.1 `pause`/`proceed`).
    pub fn pause(&self) {
        self.state.pause_gate.pause();
    }

    /// Re-open the gate (§4.1 `pause`/`proceed`).
    pub fn proceed(&self) {
        self.state.pause_gate.proceed();
    }

    /// Fork a sibling supervisor sharing this one's logger, crash logger,
    /// worst-severity accumulator, application name, process id, item
    /// info, `alwaysAddCrashInfo` and `debug`, with an independent dedup
    /// set, force/appease stacks, and pause gate (§4.1 `parallel`).
    pub fn parallel(&self) -> Supervisor {
        Supervisor {
            state: Arc::new(self.state.fork()),
        }
    }

    /// Merge `severity` into the shared worst-severity accumulator, capped
    /// by the innermost appease frame exactly like `log` caps an event's
    /// severity on its way to the main logger (§4.1 `updateWorstSeverity`).
    pub fn update_worst_severity(&self, severity: Severity) -> Severity {
        let capped = match self.state.top_appease() {
            Some(cap) if severity > cap => cap,
            _ => severity,
        };
        self.state.shared.worst_severity.merge(capped)
    }

    /// The worst (post-appease) severity observed so far.
    pub fn worst_severity(&self) -> Severity {
        self.state.shared.worst_severity.get()
    }

    /// Whether this execution has reached `Fatal` or above.
    pub fn stopped(&self) -> bool {
        self.state.stopped()
    }

    /// The current effectuation stack, as a snapshot.
    pub fn effectuation_stack(&self) -> Vec<Effectuation> {
        self.state.stack_snapshot()
    }

    /// Attach an arbitrary value under `key` in this supervisor's
    /// untyped, shared key→value map.
    pub fn attach(&self, key: impl Into<String>, value: Box<dyn Any + Send + Sync>) {
        self.state.attach(key, value);
    }

    /// Whether a value is attached under `key`.
    pub fn has_attached(&self, key: &str) -> bool {
        self.state.attached_is_some(key)
    }

    /// Close the main logger (and transitively its children) and, if set,
    /// the crash logger.
    pub fn close_loggers(&self) -> std::io::Result<()> {
        let main_result = self.state.shared.logger.close();
        let crash_result = match &self.state.shared.crash_logger {
            Some(crash) => crash.close(),
            None => Ok(()),
        };
        main_result.and(crash_result)
    }
}

struct ForceOnlyGuard<'s> {
    state: &'s SupervisorState,
}

impl Drop for ForceOnlyGuard<'_> {
    fn drop(&mut self) {
        self.state.pop_force();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effectus_core::util::TimeSource;
    use effectus_core::StepId;
    use effectus_subscriber::CollectingLogger;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, Instant, SystemTime};

    /// Advances by a fixed step on every call, so timestamps observed
    /// across a test run are deterministic and strictly increasing.
    struct FakeTimeSource {
        base: Instant,
        ticks: AtomicU64,
    }

    impl TimeSource for FakeTimeSource {
        fn now(&self) -> Instant {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.base + Duration::from_nanos(tick * 1_000)
        }

        fn wall_clock_now(&self) -> SystemTime {
            SystemTime::UNIX_EPOCH
        }
    }

    #[test]
    fn timestamps_advance_with_the_injected_time_source() {
        let collector = Arc::new(CollectingLogger::new());
        let supervisor = SupervisorBuilder::new("test-app", collector.clone())
            .time_source(Arc::new(FakeTimeSource {
                base: Instant::now(),
                ticks: AtomicU64::new(0),
            }))
            .build();

        supervisor.effectuate(StepId::new("f.rs", "a"), || {});
        supervisor.effectuate(StepId::new("f.rs", "b"), || {});

        let events = collector.events();
        assert!(events.len() >= 4);
        for pair in events.windows(2) {
            assert!(pair[0].timestamp.nanos_since_start <= pair[1].timestamp.nanos_since_start);
        }
    }

    fn build_supervisor() -> (Supervisor, Arc<CollectingLogger>) {
        let collector = Arc::new(CollectingLogger::new());
        let supervisor = SupervisorBuilder::new("test-app", collector.clone()).build();
        (supervisor, collector)
    }

    fn progress_facts(collector: &CollectingLogger) -> Vec<String> {
        collector
            .events()
            .into_iter()
            .filter(|e| e.severity == Severity::Progress)
            .map(|e| e.fact.get(effectus_core::message::Language::En).unwrap().to_string())
            .collect()
    }

    /// Scenario 1 (§8): `C` calls `A` then `B`, `B` also calls `A`; `A`
    /// only runs once under plain dedup.
    #[test]
    fn effectuate_dedupes_a_step_called_twice() {
        let (supervisor, collector) = build_supervisor();
        let a = StepId::new("f1", "A");
        let b = StepId::new("f1", "B");
        let c = StepId::new("f1", "C");
        let runs = Arc::new(Mutex::new(0u32));

        supervisor.effectuate(c.clone(), || {
            supervisor.effectuate(a.clone(), || {
                *runs.lock() += 1;
            });
            supervisor.effectuate(b.clone(), || {
                let second = supervisor.effectuate(a.clone(), || {
                    *runs.lock() += 1;
                });
                assert_eq!(second, None);
            });
        });

        assert_eq!(*runs.lock(), 1);
        let facts = progress_facts(&collector);
        assert_eq!(
            facts,
            vec![
                ">> STEP C@f1",
                ">> STEP A@f1",
                "<< DONE STEP A@f1 (duration: 0.000 seconds)",
                ">> STEP B@f1",
                "<< DONE STEP B@f1 (duration: 0.000 seconds)",
                "<< DONE STEP C@f1 (duration: 0.000 seconds)",
            ]
        );
    }

    /// Scenario 2 (§8): wrapping the nested call to `A` in `force` reruns
    /// its body even though it already executed.
    #[test]
    fn force_reruns_an_already_executed_step() {
        let (supervisor, _collector) = build_supervisor();
        let a = StepId::new("f1", "A");
        let runs = Arc::new(Mutex::new(0u32));

        supervisor.effectuate(a.clone(), || {
            *runs.lock() += 1;
        });
        let forced = supervisor.force(|| supervisor.effectuate(a.clone(), || *runs.lock() += 1));

        assert_eq!(forced, Some(()));
        assert_eq!(*runs.lock(), 2);
    }

    /// `force` only bypasses dedup for its direct children; a step nested
    /// two levels below a `force` frame, without `inherit_forced`, is still
    /// deduped normally.
    #[test]
    fn force_does_not_leak_into_grandchildren() {
        let (supervisor, _collector) = build_supervisor();
        let a = StepId::new("f1", "A");
        let runs = Arc::new(Mutex::new(0u32));

        supervisor.effectuate(a.clone(), || *runs.lock() += 1);
        supervisor.force(|| {
            // One level under `force`: dedup is bypassed here.
            supervisor.effectuate(StepId::new("f1", "B"), || {
                // Two levels under `force`, without re-forcing: back to
                // normal dedup, so this second call to `A` is skipped.
                let nested = supervisor.effectuate(a.clone(), || *runs.lock() += 1);
                assert_eq!(nested, None);
            });
        });

        assert_eq!(*runs.lock(), 1);
    }

    /// `inherit_forced` propagates the *current* top of the force stack
    /// down into a grandchild instead of unconditionally forcing.
    #[test]
    fn inherit_forced_propagates_the_current_force_state() {
        let (supervisor, _collector) = build_supervisor();
        let a = StepId::new("f1", "A");
        let runs = Arc::new(Mutex::new(0u32));

        supervisor.effectuate(a.clone(), || *runs.lock() += 1);
        supervisor.force(|| {
            supervisor.inherit_forced(|| {
                let nested = supervisor.effectuate(a.clone(), || *runs.lock() += 1);
                assert_eq!(nested, Some(()));
            });
        });

        assert_eq!(*runs.lock(), 2);
    }

    /// `disremember` restores the dedup set exactly: a step run only
    /// inside it may run again outside.
    #[test]
    fn disremember_forgets_steps_run_inside_it() {
        let (supervisor, _collector) = build_supervisor();
        let a = StepId::new("f1", "A");
        let runs = Arc::new(Mutex::new(0u32));

        supervisor.disremember(|| {
            supervisor.effectuate(a.clone(), || *runs.lock() += 1);
        });
        let outside = supervisor.effectuate(a.clone(), || *runs.lock() += 1);

        assert_eq!(outside, Some(()));
        assert_eq!(*runs.lock(), 2);
    }

    /// Scenario 4 (§8): a name both activated and dispensed with is not
    /// activated, dispensing wins.
    #[test]
    fn optional_with_name_both_activated_and_dispensed_does_not_run() {
        let mut activated = HashSet::new();
        activated.insert("m:x".to_string());
        let mut dispensed = HashSet::new();
        dispensed.insert("m:x".to_string());

        let collector = Arc::new(CollectingLogger::new());
        let supervisor = SupervisorBuilder::new("test-app", collector.clone())
            .activated_options(activated)
            .dispensed_with(dispensed)
            .build();

        let before = supervisor.worst_severity();
        let ran = Arc::new(Mutex::new(false));
        let result = supervisor.optional("m:x", || *ran.lock() = true);

        assert_eq!(result, None);
        assert!(!*ran.lock());
        assert_eq!(supervisor.worst_severity(), before);
        let facts = progress_facts(&collector);
        assert_eq!(facts, vec!["OPTIONAL PART \"m:x\" NOT ACTIVATED"]);
    }

    /// An activated, non-dispensed name runs normally.
    #[test]
    fn optional_with_an_activated_name_runs() {
        let mut activated = HashSet::new();
        activated.insert("m:x".to_string());
        let collector = Arc::new(CollectingLogger::new());
        let supervisor = SupervisorBuilder::new("test-app", collector.clone())
            .activated_options(activated)
            .build();

        let ran = Arc::new(Mutex::new(false));
        let result = supervisor.optional("m:x", || *ran.lock() = true);

        assert_eq!(result, Some(()));
        assert!(*ran.lock());
    }

    /// A dispensable part runs by default, but not once dispensed with by
    /// name.
    #[test]
    fn dispensable_runs_unless_dispensed_with() {
        let mut dispensed = HashSet::new();
        dispensed.insert("archive".to_string());
        let collector = Arc::new(CollectingLogger::new());
        let supervisor = SupervisorBuilder::new("test-app", collector.clone())
            .dispensed_with(dispensed)
            .build();

        let ran = Arc::new(Mutex::new(false));
        let skipped = supervisor.dispensable("archive", || *ran.lock() = true);
        assert_eq!(skipped, None);
        assert!(!*ran.lock());

        let ran_other = Arc::new(Mutex::new(false));
        let other = supervisor.dispensable("keep", || *ran_other.lock() = true);
        assert_eq!(other, Some(()));
        assert!(*ran_other.lock());
    }

    /// Scenario 3/5 analogue via the *sync* `Supervisor`: inside
    /// `appease(Error)`, a `Fatal` message is capped to `Error` on the main
    /// logger and does not flip `stopped`.
    #[test]
    fn appease_caps_severity_on_the_sync_supervisor() {
        let (supervisor, collector) = build_supervisor();
        let message = effectus_core::Message::new(
            None,
            Severity::Fatal,
            effectus_core::Localized::en("disk full"),
        );

        supervisor.appease(Severity::Error, || {
            supervisor.log(&message, None, false, &[]);
        });

        assert!(!supervisor.stopped());
        assert_eq!(supervisor.worst_severity(), Severity::Error);
        let events = collector.events();
        assert_eq!(events.last().unwrap().severity, Severity::Error);
    }

    /// `update_worst_severity` is bounded by the innermost appease cap just
    /// like `log`, so it cannot flip `stopped` from inside an appeased
    /// region.
    #[test]
    fn update_worst_severity_is_capped_by_appease() {
        let (supervisor, _collector) = build_supervisor();
        supervisor.appease(Severity::Error, || {
            supervisor.update_worst_severity(Severity::Fatal);
        });

        assert!(!supervisor.stopped());
        assert_eq!(supervisor.worst_severity(), Severity::Error);
    }

    /// A `parallel` fork shares the logger and worst-severity accumulator
    /// but gets an independent dedup set.
    #[test]
    fn parallel_fork_shares_sinks_but_not_the_dedup_set() {
        let (supervisor, collector) = build_supervisor();
        let a = StepId::new("f1", "A");
        supervisor.effectuate(a.clone(), || {});

        let sibling = supervisor.parallel();
        let ran_in_sibling = Arc::new(Mutex::new(false));
        let result = sibling.effectuate(a.clone(), || *ran_in_sibling.lock() = true);

        assert_eq!(result, Some(()));
        assert!(*ran_in_sibling.lock());

        let disk_full = effectus_core::Message::new(
            None,
            Severity::Error,
            effectus_core::Localized::en("shared sink"),
        );
        sibling.log(&disk_full, None, false, &[]);
        assert_eq!(supervisor.worst_severity(), Severity::Error);
        assert!(collector
            .events()
            .iter()
            .any(|e| e.fact.get(effectus_core::message::Language::En) == Some("shared sink")));
    }

    /// `pause` blocks a subsequent `effectuate` entry until `proceed` is
    /// called.
    #[test]
    fn pause_blocks_effectuate_until_proceed() {
        let (supervisor, _collector) = build_supervisor();
        supervisor.pause();

        let blocked = supervisor.clone();
        let entered = Arc::new(Mutex::new(false));
        let entered_thread = Arc::clone(&entered);
        let handle = std::thread::spawn(move || {
            blocked.effectuate(StepId::new("f1", "A"), || {
                *entered_thread.lock() = true;
            });
        });

        std::thread::sleep(Duration::from_millis(50));
        assert!(!*entered.lock());
        assert!(!handle.is_finished());

        supervisor.proceed();
        handle.join().unwrap();
        assert!(*entered.lock());
    }
}
