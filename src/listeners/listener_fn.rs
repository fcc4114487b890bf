//! # Function-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(EventPayload) -> Fut`, producing a
//! fresh future per invocation. The closure receives its own copy of the
//! payload, so no shared mutable state is needed; if state must be shared
//! across invocations, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use priobus::{EventPayload, Listen, ListenerError, ListenerFn, ListenerRef};
//!
//! let l: ListenerRef = ListenerFn::arc("greeter", |payload: EventPayload| async move {
//!     let _ = payload.data;
//!     Ok::<_, ListenerError>(())
//! });
//!
//! assert_eq!(l.name(), "greeter");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::EventPayload;
use crate::listeners::listener::Listen;

/// Function-backed listener implementation.
///
/// Wraps a closure that *creates* a new future per invocation.
#[derive(Debug)]
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::arc`] when you immediately need a [`ListenerRef`](crate::ListenerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the listener and returns it as a shared handle (`Arc<dyn Listen>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Listen for ListenerFn<F>
where
    F: Fn(EventPayload) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    async fn on_event(&self, payload: &EventPayload) -> Result<(), ListenerError> {
        (self.f)(payload.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
