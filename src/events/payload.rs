//! # Event payload created per emit call.
//!
//! [`EventPayload`] carries the event name, the opaque `data` value handed to
//! [`EventBus::emit`](crate::EventBus::emit), a wall-clock timestamp, and a
//! mutable `metadata` map that middleware stages may populate before dispatch.
//!
//! ## Ordering guarantees
//! Each payload has a globally unique sequence number (`seq`) that increases
//! monotonically across all emits in the process. History entries inherit it,
//! so `seq` restores exact emission order even across event names.
//!
//! ## Mutability
//! The payload is owned by the pipeline until dispatch begins. Once listeners
//! run, they only receive a shared reference: name, data, and metadata are
//! fixed for the rest of the emit.
//!
//! ## Example
//! ```rust
//! use priobus::EventPayload;
//! use serde_json::json;
//!
//! let payload = EventPayload::new("user.created", json!({"id": 7}))
//!     .with_meta("source", json!("api"));
//!
//! assert_eq!(&*payload.event, "user.created");
//! assert_eq!(payload.meta("source"), Some(&json!("api")));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use serde_json::{Map, Value};

/// Global sequence counter for emission ordering.
static EMIT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Payload pushed through the pipeline and into listeners for one emit.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs and history)
/// - `metadata`: string→value map, populated by middleware stages
#[derive(Clone, Debug)]
pub struct EventPayload {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Name of the emitted event.
    pub event: Arc<str>,
    /// Opaque caller-supplied value delivered to listeners.
    pub data: Value,
    /// Wall-clock timestamp taken when the emit started.
    pub at: SystemTime,
    /// Middleware-populated annotations; empty at construction.
    pub metadata: Map<String, Value>,
}

impl EventPayload {
    /// Creates a payload for the given event with the current timestamp,
    /// next sequence number, and empty metadata.
    pub fn new(event: impl Into<Arc<str>>, data: Value) -> Self {
        Self {
            seq: EMIT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            event: event.into(),
            data,
            at: SystemTime::now(),
            metadata: Map::new(),
        }
    }

    /// Attaches a metadata entry, builder-style.
    #[inline]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Inserts a metadata entry in place. Intended for middleware stages.
    #[inline]
    pub fn set_meta(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Returns the metadata value for `key`, if any stage set it.
    #[inline]
    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}
