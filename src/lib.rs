//! # priobus
//!
//! **Priobus** is a minimal in-process publish/subscribe event dispatcher for
//! async Rust.
//!
//! Listeners register against named events with optional priority and one-shot
//! semantics; emitters push data through a middleware chain and then into
//! matching listeners sequentially; emitted events are recorded in a bounded
//! append-only history. The crate is designed as a building block for
//! in-process wiring, not a message broker: no networking, no persistence,
//! no parallel fan-out.
//!
//! ## Architecture
//! ```text
//!  emit("order.placed", data)
//!         │
//!         ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  EventBus                                                 │
//! │  - MiddlewarePipeline (ordered gate, may reject)          │
//! │  - HistoryLog (bounded ring of emitted payloads)          │
//! │  - ListenerRegistry (priority-ordered buckets)            │
//! └──────┬─────────────────┬──────────────────┬───────────────┘
//!        ▼                 ▼                  ▼
//!   [stage 1..N]      history.append     registry.snapshot
//!        │                                    │
//!        │ Err ─► EmitError::Rejected         ▼
//!        │        (nothing dispatched)   listener 1 ─► listener 2 ─► ... (awaited,
//!        │                                    │        priority order, failures
//!        ▼                                    │        isolated via ErrorSink)
//!      payload ───────────────────────────────┘
//!                                             │
//!                                             ▼
//!                                     once-cleanup, EmitReport
//! ```
//!
//! ## Ordering
//! Within one emit, listeners run strictly sequentially in descending-priority
//! order; equal priorities keep registration order. The listener set is fixed
//! by a registry snapshot when dispatch starts, so concurrent registration or
//! removal never affects an in-flight emit.
//!
//! ## Features
//! | Area            | Description                                                         | Key types / traits                    |
//! |-----------------|---------------------------------------------------------------------|---------------------------------------|
//! | **Listeners**   | Register async callbacks with priority and once semantics.          | [`Listen`], [`ListenerFn`], [`ListenerOptions`] |
//! | **Middleware**  | Gate/annotate every emit before dispatch.                           | [`Middleware`], [`MiddlewareFn`]      |
//! | **History**     | Query the bounded log of emitted payloads.                          | [`HistoryEntry`], [`HistoryLog`]      |
//! | **Errors**      | Typed failure classes with different propagation.                   | [`EmitError`], [`ListenerError`], [`MiddlewareError`] |
//! | **Reporting**   | Injectable sink for isolated listener failures.                     | [`ErrorSink`], [`EmitReport`]         |
//! | **Cancellation**| Abandon a long emit between stages/listeners.                       | [`EventBus::emit_with_cancel`]        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogSink`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use priobus::{BusConfig, EventBus, EventPayload, ListenerError, ListenerFn, ListenerOptions, MiddlewareError, MiddlewareFn};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new(BusConfig::default());
//!
//!     // Gate: refuse flagged payloads before any listener sees them.
//!     bus.middleware(MiddlewareFn::arc("block-gate", |payload: EventPayload| async move {
//!         if payload.data.get("blocked").and_then(|v| v.as_bool()).unwrap_or(false) {
//!             return Err(MiddlewareError::reject("payload flagged as blocked"));
//!         }
//!         Ok(payload)
//!     }))
//!     .await;
//!
//!     // High-priority listener runs first; the one-shot listener disappears
//!     // after its first invocation.
//!     bus.on_with(
//!         "order.placed",
//!         ListenerFn::arc("invoicer", |payload: EventPayload| async move {
//!             let _ = payload.data;
//!             Ok::<_, ListenerError>(())
//!         }),
//!         ListenerOptions::new().with_priority(10),
//!     )
//!     .await;
//!     bus.once(
//!         "order.placed",
//!         ListenerFn::arc("welcome-mail", |_payload| async move { Ok(()) }),
//!     )
//!     .await;
//!
//!     let report = bus.emit("order.placed", json!({"id": 42})).await?;
//!     assert_eq!(report.delivered, 2);
//!
//!     assert_eq!(bus.history_for("order.placed").await.len(), 1);
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod listeners;
mod middleware;
mod sinks;

// ---- Public re-exports ----

pub use core::{
    BusBuilder, BusConfig, EmitReport, EventBus, HistoryEntry, HistoryLog, ListenerFailure,
    ListenerId, ListenerRecord, ListenerRegistry, Subscription,
};
pub use error::{EmitError, ListenerError, MiddlewareError};
pub use events::EventPayload;
pub use listeners::{Listen, ListenerFn, ListenerOptions, ListenerRef};
pub use middleware::{Middleware, MiddlewareFn, MiddlewarePipeline, MiddlewareRef};
pub use sinks::{ErrorSink, NoopSink};

// Optional: expose a simple built-in stdout error sink (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use sinks::LogSink;
