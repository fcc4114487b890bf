//! # EventBus: orchestrates pipeline, history, and snapshot dispatch.
//!
//! The [`EventBus`] composes the three leaf components and owns the emit flow.
//!
//! ## Key responsibilities
//! - register/remove listeners via the [`ListenerRegistry`] and hand out
//!   [`Subscription`] handles (the deregistration capability)
//! - run every emitted payload through the [`MiddlewarePipeline`] gate
//! - record cleared payloads in the bounded [`HistoryLog`]
//! - dispatch sequentially over a registry snapshot, isolating listener
//!   failures through the injected [`ErrorSink`]
//!
//! ## Emit flow
//! ```text
//! emit(event, data)
//!   │
//!   ├─► EventPayload::new(seq, now, {})                 (1) construct
//!   ├─► pipeline.run(payload)                           (2) gate
//!   │       └─ Err ─► EmitError::Rejected               (no history, no dispatch)
//!   ├─► history.append(payload)                         (3) record
//!   ├─► registry.snapshot(event)                        (4) fix listener set
//!   ├─► for record in snapshot:                         (5) sequential dispatch
//!   │       listener.on_event(&payload)  (awaited; failures/panics → sink)
//!   ├─► registry.remove_many(event, invoked once-ids)   (6) once-cleanup
//!   └─► Ok(EmitReport { delivered, failures })          (7) resolve
//! ```
//!
//! ## Rules
//! - Dispatch uses the snapshot taken in step (4): listeners registered or
//!   removed while the emit runs affect only later emits.
//! - Listeners run one at a time, in descending-priority order; ties keep
//!   registration order. Ordering is real execution order.
//! - A listener failure (error or panic) is reported to the sink and does not
//!   halt the remaining dispatch; the emit still resolves `Ok`.
//! - A once-listener present in the snapshot is removed after the emit even if
//!   it failed: exactly one invocation per matching emit, then gone.
//! - Concurrent emits interleave at await points; no lock is held while a
//!   callback runs, so a slow listener never blocks registration or other emits.
//!
//! ## Example
//! ```rust
//! use priobus::{BusConfig, EventBus, EventPayload, ListenerError, ListenerFn, ListenerOptions};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new(BusConfig::default());
//!
//!     let sub = bus
//!         .on_with(
//!             "order.placed",
//!             ListenerFn::arc("invoicer", |payload: EventPayload| async move {
//!                 let _ = payload.data;
//!                 Ok::<_, ListenerError>(())
//!             }),
//!             ListenerOptions::new().with_priority(10),
//!         )
//!         .await;
//!
//!     let report = bus.emit("order.placed", json!({"id": 42})).await?;
//!     assert_eq!(report.delivered, 1);
//!     assert!(report.is_clean());
//!
//!     sub.unsubscribe().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::core::builder::BusBuilder;
use crate::core::config::BusConfig;
use crate::core::history::{HistoryEntry, HistoryLog};
use crate::core::registry::{ListenerId, ListenerRegistry};
use crate::error::{EmitError, ListenerError};
use crate::events::EventPayload;
use crate::listeners::{ListenerOptions, ListenerRef};
use crate::middleware::{MiddlewarePipeline, MiddlewareRef};
use crate::sinks::ErrorSink;

/// Deregistration capability returned from registration.
///
/// Owns the listener's identity; [`unsubscribe`](Subscription::unsubscribe)
/// removes the listener without further arguments. Dropping the handle does
/// **not** unsubscribe - removal is always explicit, via this handle or
/// [`EventBus::off`].
pub struct Subscription {
    registry: Arc<ListenerRegistry>,
    event: Arc<str>,
    id: ListenerId,
}

impl Subscription {
    /// The registered listener's identity, usable with [`EventBus::off`].
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The event name this subscription is registered under.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Removes the listener. Idempotent with any other removal path.
    pub async fn unsubscribe(self) -> bool {
        self.registry.remove(&self.event, self.id).await
    }
}

/// A single isolated listener failure, as aggregated on the [`EmitReport`].
#[derive(Debug)]
pub struct ListenerFailure {
    /// Identity of the failing listener.
    pub listener: ListenerId,
    /// Listener name, for logs.
    pub name: String,
    /// The caught error.
    pub error: ListenerError,
}

/// Outcome of a successful emit.
///
/// "Successful" means the pipeline cleared the event and dispatch ran to the
/// end; individual listeners may still have failed, and those failures are
/// aggregated here for callers that want them.
#[derive(Debug)]
pub struct EmitReport {
    /// Name of the emitted event.
    pub event: Arc<str>,
    /// Global emission sequence number (matches the history entry).
    pub seq: u64,
    /// Number of listeners invoked (successfully or not).
    pub delivered: usize,
    /// Failures caught during dispatch, in invocation order.
    pub failures: Vec<ListenerFailure>,
}

impl EmitReport {
    /// True if every invoked listener completed without error.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// In-process publish/subscribe dispatcher with priority ordering, a
/// middleware gate, and bounded emission history.
pub struct EventBus {
    registry: Arc<ListenerRegistry>,
    pipeline: MiddlewarePipeline,
    history: HistoryLog,
    sink: Arc<dyn ErrorSink>,
}

impl EventBus {
    /// Creates a bus with the given configuration and default wiring
    /// (no middleware, [`NoopSink`](crate::NoopSink)).
    #[must_use]
    pub fn new(cfg: BusConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a [`BusBuilder`] for a bus with custom sink/middleware wiring.
    pub fn builder(cfg: BusConfig) -> BusBuilder {
        BusBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: BusConfig,
        sink: Arc<dyn ErrorSink>,
        stages: Vec<MiddlewareRef>,
    ) -> Self {
        Self {
            registry: ListenerRegistry::new(),
            pipeline: MiddlewarePipeline::from_stages(stages),
            history: HistoryLog::new(cfg.history_limit()),
            sink,
        }
    }

    /// Registers a listener with default options (priority 0, not once).
    pub async fn on(&self, event: &str, listener: ListenerRef) -> Subscription {
        self.on_with(event, listener, ListenerOptions::default()).await
    }

    /// Registers a listener with explicit [`ListenerOptions`].
    pub async fn on_with(
        &self,
        event: &str,
        listener: ListenerRef,
        opts: ListenerOptions,
    ) -> Subscription {
        let id = self.registry.register(event, listener, opts).await;
        Subscription {
            registry: Arc::clone(&self.registry),
            event: Arc::from(event),
            id,
        }
    }

    /// Registers a one-shot listener: invoked for the next matching emit,
    /// then removed (even if the invocation failed).
    pub async fn once(&self, event: &str, listener: ListenerRef) -> Subscription {
        self.on_with(event, listener, ListenerOptions::new().with_once(true))
            .await
    }

    /// Removes a listener by identity. No-op if the identity is unknown.
    pub async fn off(&self, event: &str, id: ListenerId) -> bool {
        self.registry.remove(event, id).await
    }

    /// Appends a middleware stage to the pipeline.
    ///
    /// The stage runs for every subsequent emit, after all stages registered
    /// before it. An emit already past the pipeline is unaffected.
    pub async fn middleware(&self, stage: MiddlewareRef) {
        self.pipeline.push(stage).await;
    }

    /// Emits `data` under `event` and awaits the full dispatch.
    ///
    /// See the module docs for the flow. Returns the [`EmitReport`] once every
    /// listener completed or failed; callers that need fire-and-forget must
    /// explicitly decline to await.
    pub async fn emit(&self, event: &str, data: Value) -> Result<EmitReport, EmitError> {
        self.emit_with_cancel(event, data, CancellationToken::new())
            .await
    }

    /// Emits with a cancellation token threaded through the pipeline and
    /// dispatch.
    ///
    /// Cancellation is observed **between** middleware stages and between
    /// listener invocations - a callback already running is never interrupted.
    /// Once-cleanup still runs for listeners invoked before cancellation, and
    /// the error carries the delivered count.
    pub async fn emit_with_cancel(
        &self,
        event: &str,
        data: Value,
        cancel: CancellationToken,
    ) -> Result<EmitReport, EmitError> {
        let payload = EventPayload::new(event, data);
        let payload = self.pipeline.run(payload, &cancel).await?;

        self.history.append(&payload).await;

        let snapshot = self.registry.snapshot(event).await;
        let mut delivered = 0usize;
        let mut failures = Vec::new();
        let mut invoked_once: Vec<ListenerId> = Vec::new();
        let mut cancelled = false;

        for record in &snapshot {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let invocation = record.listener().on_event(&payload);
            let outcome = std::panic::AssertUnwindSafe(invocation).catch_unwind().await;
            delivered += 1;
            if record.once() {
                invoked_once.push(record.id());
            }

            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(panic) => ListenerError::Panicked {
                    info: panic_info(panic),
                },
            };

            self.sink.report(&payload.event, record.id(), &error).await;
            failures.push(ListenerFailure {
                listener: record.id(),
                name: record.listener().name().to_string(),
                error,
            });
        }

        self.registry.remove_many(event, &invoked_once).await;

        if cancelled {
            return Err(EmitError::Cancelled { delivered });
        }

        Ok(EmitReport {
            event: Arc::clone(&payload.event),
            seq: payload.seq,
            delivered,
            failures,
        })
    }

    /// Returns the full retained history, in emission order.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.all().await
    }

    /// Returns the retained history for `event`, in emission order.
    pub async fn history_for(&self, event: &str) -> Vec<HistoryEntry> {
        self.history.for_event(event).await
    }

    /// Number of listeners currently registered under `event`.
    pub async fn listener_count(&self, event: &str) -> usize {
        self.registry.listener_count(event).await
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

/// Best-effort extraction of a panic payload message.
fn panic_info(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unhandled panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::MiddlewareError;
    use crate::listeners::ListenerFn;
    use crate::middleware::MiddlewareFn;

    type Log = Arc<Mutex<Vec<String>>>;

    fn tagger(log: &Log, tag: &'static str) -> ListenerRef {
        let log = Arc::clone(log);
        ListenerFn::arc(tag, move |_p| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(tag.to_string());
                Ok(())
            }
        })
    }

    struct RecordingSink {
        seen: Arc<Mutex<Vec<(String, ListenerId, String)>>>,
    }

    #[async_trait]
    impl ErrorSink for RecordingSink {
        async fn report(&self, event: &str, listener: ListenerId, error: &ListenerError) {
            self.seen
                .lock()
                .unwrap()
                .push((event.to_string(), listener, error.as_label().to_string()));
        }
    }

    #[tokio::test]
    async fn test_priority_scenario_with_once() {
        // A (prio 10), B (prio 5), one-shot C (prio 0); two emits of "e"
        // must observe A, B, C, A, B.
        let bus = EventBus::default();
        let log: Log = Arc::default();

        bus.on_with("e", tagger(&log, "A"), ListenerOptions::new().with_priority(10))
            .await;
        bus.on_with("e", tagger(&log, "B"), ListenerOptions::new().with_priority(5))
            .await;
        bus.once("e", tagger(&log, "C")).await;

        bus.emit("e", json!(null)).await.unwrap();
        bus.emit("e", json!(null)).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_once_listener_removed_immediately_after_emit() {
        let bus = EventBus::default();
        let log: Log = Arc::default();

        bus.once("e", tagger(&log, "C")).await;
        assert_eq!(bus.listener_count("e").await, 1);

        let report = bus.emit("e", json!(null)).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(bus.listener_count("e").await, 0, "once-listener must be gone");

        let report = bus.emit("e", json!(null)).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert_eq!(*log.lock().unwrap(), vec!["C"]);
    }

    #[tokio::test]
    async fn test_off_with_unknown_identity_is_noop() {
        let bus = EventBus::default();
        let log: Log = Arc::default();

        let keep = bus.on("e", tagger(&log, "kept")).await;
        let stray = bus.on("other", tagger(&log, "stray")).await.id();

        assert!(!bus.off("e", stray).await);
        bus.emit("e", json!(null)).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);
        drop(keep);
    }

    #[tokio::test]
    async fn test_rejecting_middleware_blocks_dispatch_and_history() {
        let bus = EventBus::default();
        let log: Log = Arc::default();

        bus.on("e", tagger(&log, "never")).await;
        bus.middleware(MiddlewareFn::arc("gate", |_p: EventPayload| async move {
            Err(MiddlewareError::reject("closed"))
        }))
        .await;

        let err = bus.emit("e", json!(null)).await.unwrap_err();
        assert!(err.is_rejection());
        assert!(log.lock().unwrap().is_empty(), "no listener may run");
        assert!(bus.history().await.is_empty(), "rejected emit must not be recorded");
    }

    #[tokio::test]
    async fn test_blocked_flag_gate_scenario() {
        let bus = EventBus::default();
        let log: Log = Arc::default();

        bus.on("e", tagger(&log, "handler")).await;
        bus.middleware(MiddlewareFn::arc("block-gate", |p: EventPayload| async move {
            if p.data.get("blocked").and_then(|v| v.as_bool()).unwrap_or(false) {
                return Err(MiddlewareError::reject("payload flagged as blocked"));
            }
            Ok(p)
        }))
        .await;

        let err = bus.emit("e", json!({"blocked": true})).await.unwrap_err();
        assert_eq!(err.as_label(), "emit_rejected");
        assert!(log.lock().unwrap().is_empty());

        let report = bus.emit("e", json!({"blocked": false})).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(*log.lock().unwrap(), vec!["handler"]);
    }

    #[tokio::test]
    async fn test_middleware_metadata_reaches_listeners_and_history() {
        let bus = EventBus::default();
        let seen: Arc<Mutex<Vec<Option<Value>>>> = Arc::default();

        bus.middleware(MiddlewareFn::arc("stamp", |mut p: EventPayload| async move {
            p.set_meta("stamped", json!(true));
            Ok(p)
        }))
        .await;

        let seen_in = Arc::clone(&seen);
        bus.on(
            "e",
            ListenerFn::arc("observer", move |p: EventPayload| {
                let seen = Arc::clone(&seen_in);
                async move {
                    seen.lock().unwrap().push(p.meta("stamped").cloned());
                    Ok(())
                }
            }),
        )
        .await;

        bus.emit("e", json!(null)).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Some(json!(true))]);
        let history = bus.history_for("e").await;
        assert_eq!(history[0].metadata.get("stamped"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_failing_listener_is_isolated_and_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::builder(BusConfig::default())
            .with_error_sink(Arc::new(RecordingSink { seen: Arc::clone(&seen) }))
            .build();
        let log: Log = Arc::default();

        bus.on_with("e", tagger(&log, "first"), ListenerOptions::new().with_priority(2))
            .await;
        let failing = bus
            .on_with(
                "e",
                ListenerFn::arc("flaky", |_p| async { Err(ListenerError::fail("boom")) }),
                ListenerOptions::new().with_priority(1),
            )
            .await;
        bus.on_with("e", tagger(&log, "last"), ListenerOptions::new().with_priority(0))
            .await;

        let report = bus.emit("e", json!(null)).await.unwrap();

        assert_eq!(report.delivered, 3);
        assert!(!report.is_clean());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].listener, failing.id());
        assert_eq!(report.failures[0].name, "flaky");

        assert_eq!(*log.lock().unwrap(), vec!["first", "last"], "dispatch must continue");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "e");
        assert_eq!(seen[0].1, failing.id());
        assert_eq!(seen[0].2, "listener_failed");
    }

    #[tokio::test]
    async fn test_panicking_listener_is_caught() {
        let bus = EventBus::default();
        let log: Log = Arc::default();

        bus.on_with(
            "e",
            ListenerFn::arc("bomb", |_p| async { panic!("kaboom") }),
            ListenerOptions::new().with_priority(1),
        )
        .await;
        bus.on("e", tagger(&log, "survivor")).await;

        let report = bus.emit("e", json!(null)).await.unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].error.is_panic());
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    }

    #[tokio::test]
    async fn test_failed_once_listener_is_still_removed() {
        let bus = EventBus::default();

        bus.once(
            "e",
            ListenerFn::arc("flaky-once", |_p| async { Err(ListenerError::fail("boom")) }),
        )
        .await;

        let report = bus.emit("e", json!(null)).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(bus.listener_count("e").await, 0, "failure still counts as the one shot");
    }

    #[tokio::test]
    async fn test_emit_with_no_listeners_is_ok_and_recorded() {
        let bus = EventBus::default();
        let report = bus.emit("ghost", json!(1)).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert!(report.is_clean());
        assert_eq!(bus.history_for("ghost").await.len(), 1);
    }

    #[tokio::test]
    async fn test_history_bounded_and_filtered() {
        let bus = EventBus::new(BusConfig { history_capacity: 3 });

        bus.emit("x", json!(1)).await.unwrap();
        bus.emit("y", json!(2)).await.unwrap();
        bus.emit("x", json!(3)).await.unwrap();
        bus.emit("x", json!(4)).await.unwrap();

        let all = bus.history().await;
        assert_eq!(all.len(), 3, "oldest entry evicted at capacity");
        assert_eq!(&*all[0].event, "y");

        let xs = bus.history_for("x").await;
        let data: Vec<&Value> = xs.iter().map(|e| &e.data).collect();
        assert_eq!(data, vec![&json!(3), &json!(4)], "evicted x:1 must be absent");
    }

    #[tokio::test]
    async fn test_unsubscribe_via_subscription_handle() {
        let bus = EventBus::default();
        let log: Log = Arc::default();

        let sub = bus.on("e", tagger(&log, "gone")).await;
        assert!(sub.unsubscribe().await);

        let report = bus.emit("e", json!(null)).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reregistering_same_listener_creates_distinct_record() {
        let bus = EventBus::default();
        let log: Log = Arc::default();

        let listener = tagger(&log, "dup");
        let a = bus.on("e", Arc::clone(&listener)).await;
        let b = bus.on("e", listener).await;
        assert_ne!(a.id(), b.id());

        bus.emit("e", json!(null)).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["dup", "dup"]);
    }

    #[tokio::test]
    async fn test_cancellation_stops_dispatch_and_cleans_invoked_once() {
        let bus = EventBus::default();
        let log: Log = Arc::default();
        let cancel = CancellationToken::new();

        // first listener cancels the emit; it is a once-listener and must be
        // cleaned up even though the emit ends cancelled
        let token = cancel.clone();
        let log_in = Arc::clone(&log);
        bus.on_with(
            "e",
            ListenerFn::arc("canceller", move |_p| {
                let token = token.clone();
                let log = Arc::clone(&log_in);
                async move {
                    log.lock().unwrap().push("canceller".to_string());
                    token.cancel();
                    Ok(())
                }
            }),
            ListenerOptions::new().with_priority(10).with_once(true),
        )
        .await;
        bus.on("e", tagger(&log, "late")).await;

        let err = bus
            .emit_with_cancel("e", json!(null), cancel)
            .await
            .unwrap_err();

        match err {
            EmitError::Cancelled { delivered } => assert_eq!(delivered, 1),
            other => panic!("expected Cancelled, got {other:?}"),
        }
        assert_eq!(*log.lock().unwrap(), vec!["canceller"], "late listener must not run");
        assert_eq!(
            bus.listener_count("e").await,
            1,
            "invoked once-listener removed, uninvoked listener kept"
        );
    }

    #[tokio::test]
    async fn test_listener_registered_during_dispatch_misses_current_emit() {
        let bus = Arc::new(EventBus::default());
        let log: Log = Arc::default();

        let bus_in = Arc::clone(&bus);
        let log_in = Arc::clone(&log);
        bus.on(
            "e",
            ListenerFn::arc("registrar", move |_p| {
                let bus = Arc::clone(&bus_in);
                let log = Arc::clone(&log_in);
                async move {
                    log.lock().unwrap().push("registrar".to_string());
                    let tag = Arc::clone(&log);
                    bus.on(
                        "e",
                        ListenerFn::arc("late-joiner", move |_p| {
                            let log = Arc::clone(&tag);
                            async move {
                                log.lock().unwrap().push("late-joiner".to_string());
                                Ok(())
                            }
                        }),
                    )
                    .await;
                    Ok(())
                }
            }),
        )
        .await;

        bus.emit("e", json!(null)).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["registrar"], "snapshot fixed at dispatch start");

        bus.emit("e", json!(null)).await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["registrar", "registrar", "late-joiner"],
            "second emit sees the late registration"
        );
    }
}
