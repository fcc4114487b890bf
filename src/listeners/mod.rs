//! # Listener abstractions.
//!
//! This module defines the [`Listen`] trait (async, fallible), a convenient
//! function-backed implementation [`ListenerFn`], and the [`ListenerOptions`]
//! bundle controlling priority and one-shot registration. The common handle
//! type is [`ListenerRef`], an `Arc<dyn Listen>` suitable for storing in the
//! registry and cloning into dispatch snapshots.

mod listener;
mod listener_fn;
mod options;

pub use listener::{Listen, ListenerRef};
pub use listener_fn::ListenerFn;
pub use options::ListenerOptions;
