//! Event data model.
//!
//! This module holds the payload type constructed for every emit and pushed
//! through the middleware pipeline into listeners. The bounded history of
//! emitted payloads lives in `core/history.rs`; the orchestration that
//! produces payloads lives in `core/bus.rs`.

mod payload;

pub use payload::EventPayload;
