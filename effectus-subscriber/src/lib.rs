#![deny(missing_debug_implementations)]

//! Composable [`effectus_core::Logger`] sinks for `effectus`: print,
//! fan-out, prefix decoration, an in-memory collector, and an HTTP POST
//! sink.
//!
//! `effectus-appender` is the sibling crate for the sinks that need a
//! background worker thread (the concurrent logger and the file sink).

mod collecting;
mod http;
mod multi;
mod prefix;
mod print;

pub use collecting::CollectingLogger;
pub use http::HttpLogger;
pub use multi::MultiLogger;
pub use prefix::PrefixLogger;
pub use print::PrintLogger;
