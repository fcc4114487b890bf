//! # Listener registry - per-event ordered buckets.
//!
//! The registry owns every [`ListenerRecord`] under its event-name bucket and
//! maintains the dispatch ordering invariant: descending priority, ties broken
//! by ascending registration sequence (stable insertion order).
//!
//! ## Rules
//! - Ordering is maintained by **ordered insertion** (`partition_point`), never
//!   by re-sorting: a new record lands after every record with priority >= its
//!   own, so equal-priority listeners keep registration order.
//! - Removal is idempotent: removing an unknown identity is a no-op.
//! - Dispatch never iterates the live bucket; it takes a [`snapshot`](ListenerRegistry::snapshot)
//!   and the lock is released before any callback runs. Registering or removing
//!   a listener during dispatch affects only emits whose snapshot has not been
//!   taken yet.
//! - A record appears in at most one bucket; empty buckets are dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::listeners::{ListenerOptions, ListenerRef};

/// Opaque identity of a registered listener.
///
/// Allocated by the registry at registration time (UUID v4, not enumerable),
/// returned to the caller, and used only for removal. Never serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One registered listener inside an event bucket.
///
/// Snapshots hand these out by clone; the listener itself is an `Arc`, so a
/// snapshot stays valid even if the record is removed mid-dispatch.
#[derive(Clone)]
pub struct ListenerRecord {
    id: ListenerId,
    listener: ListenerRef,
    priority: i32,
    once: bool,
    seq: u64,
}

impl ListenerRecord {
    /// Identity token usable with [`ListenerRegistry::remove`].
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Dispatch priority; higher runs earlier.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// True for one-shot listeners.
    pub fn once(&self) -> bool {
        self.once
    }

    /// Registration sequence number (tie-break within equal priority).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn listener(&self) -> &ListenerRef {
        &self.listener
    }
}

/// Per-event registry of listeners with priority-ordered buckets.
pub struct ListenerRegistry {
    buckets: RwLock<HashMap<Arc<str>, Vec<ListenerRecord>>>,
    next_seq: AtomicU64,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            buckets: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        })
    }

    /// Registers a listener under `event` and returns its identity.
    ///
    /// The record is inserted at the position found by binary search on
    /// priority: all records with `priority >= opts.priority` precede it.
    /// Since every earlier record carries a lower sequence number, ties stay
    /// in registration order without re-sorting.
    ///
    /// Registering the same listener twice creates two distinct records.
    pub async fn register(
        &self,
        event: &str,
        listener: ListenerRef,
        opts: ListenerOptions,
    ) -> ListenerId {
        let record = ListenerRecord {
            id: ListenerId::new(),
            listener,
            priority: opts.priority,
            once: opts.once,
            seq: self.next_seq.fetch_add(1, AtomicOrdering::Relaxed),
        };
        let id = record.id;

        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(Arc::from(event)).or_default();
        let at = bucket.partition_point(|r| r.priority >= record.priority);
        bucket.insert(at, record);
        id
    }

    /// Removes the record with the given identity from `event`'s bucket.
    ///
    /// Returns whether a record was removed; removing an unknown identity is a
    /// no-op. A dispatch snapshot taken earlier still holds its own handle to
    /// the listener, so an invocation already in flight is unaffected.
    pub async fn remove(&self, event: &str, id: ListenerId) -> bool {
        let mut buckets = self.buckets.write().await;
        let Some(bucket) = buckets.get_mut(event) else {
            return false;
        };
        let Some(at) = bucket.iter().position(|r| r.id == id) else {
            return false;
        };
        bucket.remove(at);
        if bucket.is_empty() {
            buckets.remove(event);
        }
        true
    }

    /// Removes a batch of identities from `event`'s bucket in one lock hold.
    ///
    /// Used for once-cleanup after dispatch; unknown identities are skipped.
    pub(crate) async fn remove_many(&self, event: &str, ids: &[ListenerId]) {
        if ids.is_empty() {
            return;
        }
        let mut buckets = self.buckets.write().await;
        if let Some(bucket) = buckets.get_mut(event) {
            bucket.retain(|r| !ids.contains(&r.id));
            if bucket.is_empty() {
                buckets.remove(event);
            }
        }
    }

    /// Returns a copy of `event`'s bucket in dispatch order.
    ///
    /// The copy decouples dispatch from registration: mutations after the
    /// snapshot do not affect the emit that took it.
    pub async fn snapshot(&self, event: &str) -> Vec<ListenerRecord> {
        let buckets = self.buckets.read().await;
        buckets.get(event).cloned().unwrap_or_default()
    }

    /// Number of listeners currently registered under `event`.
    pub async fn listener_count(&self, event: &str) -> usize {
        let buckets = self.buckets.read().await;
        buckets.get(event).map_or(0, Vec::len)
    }

    /// True if no listener is registered under any event.
    pub async fn is_empty(&self) -> bool {
        self.buckets.read().await.is_empty()
    }
}
