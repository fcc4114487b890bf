//! Dispatcher core: orchestration and ownership of listener state.
//!
//! This module contains the components composed by [`EventBus`]:
//! - [`registry`](self): per-event ordered listener buckets with snapshot dispatch;
//! - [`history`](self): bounded append-only record of emitted payloads;
//! - [`bus`](self): the emit orchestration (pipeline → history → dispatch → once-cleanup);
//! - [`builder`](self): wiring of sink and initial middleware;
//! - [`config`](self): capacity settings.

mod builder;
mod bus;
mod config;
mod history;
mod registry;

pub use builder::BusBuilder;
pub use bus::{EmitReport, EventBus, ListenerFailure, Subscription};
pub use config::BusConfig;
pub use history::{HistoryEntry, HistoryLog};
pub use registry::{ListenerId, ListenerRecord, ListenerRegistry};
