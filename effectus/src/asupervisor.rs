//! The cooperative-async mirror of [`crate::Supervisor`] (§4.3, §5).
//!
//! Every sync operator has an `async fn` mirror here, operating against the
//! exact same [`crate::state::SupervisorState`]. The async façade holds a
//! non-owning `Arc` into the same state the sync supervisor owns, per the
//! Design Notes' guidance on the async holder's back-reference. Access is
//! serialized by a single-owner discipline: one logical task drives an
//! `AsyncSupervisor` at a time; suspension points inside user bodies do not
//! release that ownership. Concurrent use of *sibling* supervisors obtained
//! via [`AsyncSupervisor::parallel`] is fine, since each owns its own stacks.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use effectus_core::event::ItemPositionInfo;
use effectus_core::message::Message;
use effectus_core::{Effectuation, Severity, StepId};

use crate::state::SupervisorState;
use crate::supervisor::Supervisor;

/// The async mirror of [`Supervisor`]. Construct one from a `Supervisor`
/// via [`AsyncSupervisor::from_sync`].
#[derive(Clone)]
pub struct AsyncSupervisor {
    state: Arc<SupervisorState>,
}

impl std::fmt::Debug for AsyncSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSupervisor")
            .field("application_name", &self.state.shared.application_name)
            .field("stopped", &self.state.stopped())
            .finish()
    }
}

impl AsyncSupervisor {
    /// Build an async façade over the same state a [`Supervisor`] owns.
    pub fn from_sync(supervisor: &Supervisor) -> Self {
        AsyncSupervisor {
            state: Arc::clone(&supervisor.state),
        }
    }

    /// The pause gate is not awaited automatically by async step entries
    /// (§5, §9 "Suspension control for pause"); call this explicitly at the
    /// top of a step body that should honor `pause`/`proceed`.
    pub async fn await_pause_gate(&self) {
        // `PauseGate::checkpoint` is a blocking wait; since the async
        // family only owns the supervisor cooperatively (no concurrent
        // callers), a short blocking wait here cannot deadlock the rest of
        // the program the way it could if other tasks needed this
        // supervisor concurrently.
        self.state.pause_gate.checkpoint();
    }

    /// Async mirror of [`Supervisor::effectuate`]. Does **not** await the
    /// pause gate; call [`await_pause_gate`](Self::await_pause_gate)
    /// explicitly if the step should honor `pause`.
    pub async fn effectuate<R, Fut>(&self, step: StepId, body: impl FnOnce() -> Fut) -> Option<R>
    where
        Fut: Future<Output = R>,
    {
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

        self.state
            .log_internal(Severity::Progress, format!(">> STEP {step}"));
        self.state.push_frame(Effectuation::Step(step.clone()));
        self.state.push_force(false);
        self.state.mark_executed(step.clone());

        self.state.run_before_hook(&step);
        let start = Instant::now();
        let result = body().await;
        let elapsed = start.elapsed();

        self.state.pop_force();
        self.state.pop_frame();
        self.state.run_after_hook(&step);

        let verb = if self.state.stopped() { "ABORDED" } else { "DONE" };
        self.state.log_internal(
            Severity::Progress,
            format!("<< {verb} STEP {step} (duration: {:.3} seconds)", elapsed.as_secs_f64()),
        );
        Some(result)
    }

    /// Async mirror of [`Supervisor::force`].
    pub async fn force<R, Fut>(&self, body: impl FnOnce() -> Fut) -> R
    where
        Fut: Future<Output = R>,
    {
        self.state.push_force(true);
        let result = body().await;
        self.state.pop_force();
        result
    }

    /// Async mirror of [`Supervisor::inherit_forced`].
    pub async fn inherit_forced<R, Fut>(&self, body: impl FnOnce() -> Fut) -> R
    where
        Fut: Future<Output = R>,
    {
        let inherited = self.state.top_force();
        self.state.push_force(inherited);
        let result = body().await;
        self.state.pop_force();
        result
    }

    /// Async mirror of [`Supervisor::disremember`].
    pub async fn disremember<R, Fut>(&self, body: impl FnOnce() -> Fut) -> R
    where
        Fut: Future<Output = R>,
    {
        let snapshot = self.state.snapshot_executed();
        let result = body().await;
        self.state.restore_executed(snapshot);
        result
    }

    /// Async mirror of [`Supervisor::optional`].
    pub async fn optional<R, Fut>(&self, name: impl Into<String>, body: impl FnOnce() -> Fut) -> Option<R>
    where
        Fut: Future<Output = R>,
    {
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
        let result = body().await;
        self.state.pop_frame();
        self.state
            .log_internal(Severity::Progress, format!("<< DONE OPTIONAL PART \"{name}\""));
        Some(result)
    }

    /// Async mirror of [`Supervisor::dispensable`].
    pub async fn dispensable<R, Fut>(&self, name: impl Into<String>, body: impl FnOnce() -> Fut) -> Option<R>
    where
        Fut: Future<Output = R>,
    {
        let name = name.into();
        if self.state.is_dispensed(&name) {
            self.state
                .log_internal(Severity::Progress, format!("DISPENSABLE PART \"{name}\" DEACTIVATED"));
            return None;
        }
        self.state
            .log_internal(Severity::Progress, format!(">> START DISPENSABLE PART \"{name}\""));
        self.state.push_frame(Effectuation::DispensablePart(name.clone()));
        let result = body().await;
        self.state.pop_frame();
        self.state
            .log_internal(Severity::Progress, format!("<< DONE DISPENSABLE PART \"{name}\""));
        Some(result)
    }

    /// Async mirror of [`Supervisor::dispensable_is_active`].
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

    /// Async mirror of [`Supervisor::appease`].
    pub async fn appease<R, Fut>(&self, severity: Severity, body: impl FnOnce() -> Fut) -> R
    where
        Fut: Future<Output = R>,
    {
        self.state.push_appease(severity);
        let result = body().await;
        self.state.pop_appease();
        result
    }

    /// Async mirror of [`Supervisor::doing`].
    pub async fn doing<R, Fut>(&self, description: impl Into<String>, body: impl FnOnce() -> Fut) -> R
    where
        Fut: Future<Output = R>,
    {
        let description = description.into();
        self.state
            .log_internal(Severity::Progress, format!("START DOING {description}"));
        self.state
            .push_frame(Effectuation::DescribedPart(description.clone()));
        let result = body().await;
        self.state.pop_frame();
        self.state
            .log_internal(Severity::Progress, format!("DONE DOING {description}"));
        result
    }

    /// Async mirror of [`Supervisor::log`].
    pub fn log(
        &self,
        message: &Message,
        item_position_info: Option<ItemPositionInfo>,
        add_crash_info: bool,
        args: &[&str],
    ) {
        self.state.log(message, item_position_info, add_crash_info, args);
    }

    /// Fork a sibling async supervisor (§4.1 `parallel`).
    pub fn parallel(&self) -> AsyncSupervisor {
        AsyncSupervisor {
            state: Arc::new(self.state.fork()),
        }
    }

    /// Whether this execution has reached `Fatal` or above.
    pub fn stopped(&self) -> bool {
        self.state.stopped()
    }

    /// The worst (post-appease) severity observed so far.
    pub fn worst_severity(&self) -> Severity {
        self.state.shared.worst_severity.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::SupervisorBuilder;
    use effectus_core::{Localized, Message};
    use effectus_subscriber::CollectingLogger;
    use std::sync::Arc;

    fn test_supervisor() -> (Supervisor, Arc<CollectingLogger>) {
        let collector = Arc::new(CollectingLogger::new());
        let sup = SupervisorBuilder::new("demo", collector.clone()).build();
        (sup, collector)
    }

    #[tokio::test]
    async fn async_effectuate_dedupes_like_sync() {
        let (sup, _collector) = test_supervisor();
        let asup = AsyncSupervisor::from_sync(&sup);
        let id = StepId::new("f.rs", "step_a");
        let first = asup.effectuate(id.clone(), || async { 1 }).await;
        let second = asup.effectuate(id, || async { 2 }).await;
        assert_eq!(first, Some(1));
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn async_appease_caps_severity() {
        let (sup, collector) = test_supervisor();
        let asup = AsyncSupervisor::from_sync(&sup);
        let message = Message::new(None, Severity::Fatal, Localized::en("bad"));
        asup.appease(Severity::Error, || async {
            asup.log(&message, None, false, &[]);
        })
        .await;
        assert!(!asup.stopped());
        let events = collector.events();
        assert_eq!(events.last().unwrap().severity, Severity::Error);
    }
}
