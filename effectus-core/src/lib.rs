#![deny(missing_debug_implementations)]

//! Core data model for `effectus`.
//!
//! `effectus` is a framework for supervising the execution of a tree of
//! user-defined steps for a single work item, and for emitting structured,
//! hierarchically tagged diagnostic events as it does so. This crate
//! defines the core primitives of `effectus`.
//!
//! This crate provides:
//!
//! * [`Severity`] and [`WorstSeverity`], the totally-ordered severity scale
//!   and its thread-safe monotonic accumulator.
//! * [`Message`], [`Localized`], and [`MessagesHolder`], the
//!   localized-message catalog.
//! * [`StepId`] and [`Effectuation`], step identity and the effectuation
//!   context-stack frames.
//! * [`LoggingEvent`], the immutable record produced by every `log` call,
//!   and its JSON wire encoding.
//! * [`Logger`] and [`SeverityFilter`], the pluggable sink contract.
//!
//! Application authors will typically not depend on this crate directly.
//! Instead, they depend on `effectus`, which provides the execution
//! supervisor built on top of these primitives; `effectus-appender` and
//! `effectus-subscriber` provide concrete [`Logger`] implementations.

pub mod effectuation;
pub mod error;
pub mod event;
pub mod format;
pub mod logger;
pub mod message;
pub mod severity;
pub mod util;

pub use effectuation::{Effectuation, StepId};
pub use error::Error;
pub use event::{ItemInfo, ItemPositionInfo, LoggingEvent, Timestamp};
pub use logger::{Filter, Logger, SeverityFilter};
pub use message::{Language, Localized, Message, MessageId, MessagesHolder, StepDataCollector};
pub use severity::{Severity, WorstSeverity};
