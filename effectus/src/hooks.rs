//! Before/after step hooks (§4.1).

use effectus_core::StepId;

/// A hook invoked around a step entry, given the (pre-incremented)
/// operation count and the step's identity. Returning `false` rejects the
/// increment, see [`crate::state::SupervisorState::run_before_hook`] and
/// [`crate::state::SupervisorState::run_after_hook`].
///
/// Hooks run synchronously with the operator that triggers them and must
/// not themselves call back into any supervisor operator; doing so is
/// undefined behavior (the state is not reentrant for hook callbacks).
pub type StepHook = Box<dyn Fn(u64, &StepId) -> bool + Send + Sync>;
