#![deny(missing_debug_implementations)]

//! `effectus` supervises the execution of a tree of user-defined steps for
//! a single work item.
//!
//! It deduplicates step execution by identity, exposes structured controls
//! (`force`, `optional`, `dispensable`, `appease`, `disremember`,
//! `inherit_forced`), and emits rich, hierarchically tagged logging events
//! through a pluggable [`effectus_core::Logger`] pipeline.
//!
//! This crate provides:
//!
//! * [`Supervisor`], the synchronous execution supervisor.
//! * [`asupervisor::AsyncSupervisor`], its cooperative-async mirror.
//! * [`SupervisorBuilder`], for constructing a [`Supervisor`].
//!
//! Application authors depend on this crate together with
//! `effectus-appender` and/or `effectus-subscriber` for concrete logger
//! sinks.

pub mod asupervisor;
mod hooks;
mod pause;
mod state;
mod supervisor;

pub use effectus_core as core;
pub use hooks::StepHook;
pub use pause::PauseGate;
pub use supervisor::{Supervisor, SupervisorBuilder};
