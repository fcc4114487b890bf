//! # Failure reporting seam.
//!
//! This module provides the [`ErrorSink`] trait the dispatcher calls for every
//! isolated listener failure, plus built-in implementations: [`NoopSink`]
//! (default) and, behind the `logging` feature, a stdout [`LogSink`].

#[cfg(feature = "logging")]
mod log;
mod sink;

#[cfg(feature = "logging")]
pub use log::LogSink;
pub use sink::{ErrorSink, NoopSink};
