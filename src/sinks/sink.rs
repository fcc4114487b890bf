//! # Error sink: injectable reporting for isolated listener failures.
//!
//! Provides [`ErrorSink`], the capability the bus invokes for every listener
//! failure caught during dispatch. Injecting a sink decouples the core from
//! any particular logging mechanism.
//!
//! ## Rules
//! - The sink observes failures; it cannot veto or retry them.
//! - Called inline from the emitting task, after the failing listener and
//!   before the next one - keep it fast, use async I/O.
//! - The default sink is [`NoopSink`]; a simple stdout reporter is available
//!   behind the `logging` feature.

use async_trait::async_trait;

use crate::core::ListenerId;
use crate::error::ListenerError;

/// Receiver for isolated listener failures.
///
/// One call per failing listener per emit, with the event name, the failing
/// listener's identity, and the caught error.
#[async_trait]
pub trait ErrorSink: Send + Sync + 'static {
    /// Reports a single listener failure.
    async fn report(&self, event: &str, listener: ListenerId, error: &ListenerError);
}

/// Sink that discards every report. The default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

#[async_trait]
impl ErrorSink for NoopSink {
    async fn report(&self, _event: &str, _listener: ListenerId, _error: &ListenerError) {}
}
