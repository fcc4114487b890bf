//! # Middleware stage trait.
//!
//! Provides [`Middleware`], the extension point run against every emitted
//! payload before dispatch. Stages own the payload while they run and hand it
//! to the next stage, so they can annotate `metadata` (or inspect `data`)
//! without locking.
//!
//! ## Rules
//! - Stages run sequentially in registration order, awaited one at a time.
//! - A failing stage stops the pipeline and rejects the whole emit: nothing is
//!   recorded in history and no listener is invoked. This is the intended
//!   mechanism for validation/auth gates.
//! - Stage failures propagate to the emitter, unlike listener failures, which
//!   are isolated.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use priobus::{EventPayload, Middleware, MiddlewareError};
//! use serde_json::json;
//!
//! struct Stamp;
//!
//! #[async_trait]
//! impl Middleware for Stamp {
//!     async fn handle(&self, mut payload: EventPayload) -> Result<EventPayload, MiddlewareError> {
//!         payload.set_meta("stamped", json!(true));
//!         Ok(payload)
//!     }
//!
//!     fn name(&self) -> &str { "stamp" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MiddlewareError;
use crate::events::EventPayload;

/// Shared handle to a middleware stage, as stored in the pipeline.
pub type MiddlewareRef = Arc<dyn Middleware>;

/// Transform/inspect stage applied to every emitted payload before dispatch.
///
/// Receives the payload by value and returns it (possibly amended) for the
/// next stage. Returning an error aborts the emit with
/// [`EmitError::Rejected`](crate::EmitError::Rejected).
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Processes one payload, passing it on or rejecting the emit.
    async fn handle(&self, payload: EventPayload) -> Result<EventPayload, MiddlewareError>;

    /// Returns the stage name used in rejection errors.
    ///
    /// The default uses `type_name::<Self>()` - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
