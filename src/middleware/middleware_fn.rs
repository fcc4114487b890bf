//! # Function-backed middleware stage (`MiddlewareFn`)
//!
//! [`MiddlewareFn`] wraps a closure `F: Fn(EventPayload) -> Fut`, producing a
//! fresh future per emit, mirroring [`ListenerFn`](crate::ListenerFn).
//!
//! ## Example
//! ```rust
//! use priobus::{EventPayload, Middleware, MiddlewareError, MiddlewareFn, MiddlewareRef};
//! use serde_json::json;
//!
//! let gate: MiddlewareRef = MiddlewareFn::arc("block-gate", |payload: EventPayload| async move {
//!     if payload.data.get("blocked").and_then(|v| v.as_bool()).unwrap_or(false) {
//!         return Err(MiddlewareError::reject("payload flagged as blocked"));
//!     }
//!     Ok(payload)
//! });
//!
//! assert_eq!(gate.name(), "block-gate");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MiddlewareError;
use crate::events::EventPayload;
use crate::middleware::middleware::Middleware;

/// Function-backed middleware implementation.
#[derive(Debug)]
pub struct MiddlewareFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> MiddlewareFn<F> {
    /// Creates a new function-backed stage.
    ///
    /// Prefer [`MiddlewareFn::arc`] when you immediately need a [`MiddlewareRef`](crate::MiddlewareRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the stage and returns it as a shared handle (`Arc<dyn Middleware>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Middleware for MiddlewareFn<F>
where
    F: Fn(EventPayload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<EventPayload, MiddlewareError>> + Send + 'static,
{
    async fn handle(&self, payload: EventPayload) -> Result<EventPayload, MiddlewareError> {
        (self.f)(payload).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
