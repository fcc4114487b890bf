//! # Bounded append-only history of emitted events.
//!
//! [`HistoryLog`] records a snapshot of every payload that cleared the
//! middleware pipeline, in emission order, queryable by event name.
//!
//! ## Capacity behavior
//! The log is a ring: when the configured capacity is reached, appending a new
//! entry evicts the oldest one. Only the most recent `capacity` entries are
//! retained, across all event names. A rejected emit never reaches the log.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::events::EventPayload;

/// Immutable snapshot of an [`EventPayload`] at emit time.
///
/// Taken after the pipeline ran, so `metadata` reflects what listeners saw.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Global emission sequence number.
    pub seq: u64,
    /// Name of the emitted event.
    pub event: Arc<str>,
    /// The emitted data value.
    pub data: Value,
    /// Metadata as populated by middleware.
    pub metadata: Map<String, Value>,
    /// Wall-clock timestamp of the emit.
    pub at: SystemTime,
}

impl HistoryEntry {
    fn snapshot(payload: &EventPayload) -> Self {
        Self {
            seq: payload.seq,
            event: Arc::clone(&payload.event),
            data: payload.data.clone(),
            metadata: payload.metadata.clone(),
            at: payload.at,
        }
    }
}

/// Bounded append-only record of emitted payloads.
pub struct HistoryLog {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: Option<usize>,
}

impl HistoryLog {
    /// Creates a log bounded to `capacity` entries (`None` = unbounded).
    #[must_use]
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            capacity,
        }
    }

    /// Appends a snapshot of the payload, evicting the oldest entry on overflow.
    pub(crate) async fn append(&self, payload: &EventPayload) {
        let mut entries = self.entries.write().await;
        entries.push_back(HistoryEntry::snapshot(payload));
        if let Some(cap) = self.capacity {
            while entries.len() > cap {
                entries.pop_front();
            }
        }
    }

    /// Returns every retained entry in emission order.
    pub async fn all(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    /// Returns the retained entries for `event`, in emission order.
    pub async fn for_event(&self, event: &str) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| &*e.event == event)
            .cloned()
            .collect()
    }

    /// Number of retained entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True if nothing has been recorded (or everything was evicted).
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
