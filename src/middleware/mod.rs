//! # Middleware abstractions and the emit pipeline.
//!
//! This module defines the [`Middleware`] trait (async, fallible, payload
//! ownership threaded stage to stage), the function-backed [`MiddlewareFn`]
//! adapter, and the [`MiddlewarePipeline`] every emit runs through before
//! history and dispatch.
//!
//! ```text
//! emit(event, data)
//!      │
//!      ▼
//! [stage 1] ─► [stage 2] ─► ... ─► [stage N] ─► history ─► dispatch
//!      │             │                  │
//!      └─ Err ───────┴─ Err ────────────┴─► EmitError::Rejected (emit aborted)
//! ```

#[allow(clippy::module_inception)]
mod middleware;
mod middleware_fn;
mod pipeline;

pub use middleware::{Middleware, MiddlewareRef};
pub use middleware_fn::MiddlewareFn;
pub use pipeline::MiddlewarePipeline;
