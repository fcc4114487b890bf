//! # Listener trait.
//!
//! Provides [`Listen`], the extension point for reacting to emitted events.
//!
//! Each listener gets:
//! - **Sequential invocation** in priority order (awaited, never concurrent)
//! - **Failure isolation** (errors and panics are caught and reported to the
//!   error sink; the remaining dispatch continues)
//! - **At-most-once delivery** per registration per matching emit
//!
//! ## Rules
//! - Listeners are invoked one at a time; a slow listener delays the listeners
//!   behind it in the same emit, never listeners of other emits.
//! - Returning an error does not remove the listener; once-listeners are
//!   removed after their first invocation whether it succeeded or failed.
//! - Do not block the executor; use async I/O inside `on_event`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use priobus::{EventPayload, Listen, ListenerError};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Listen for Audit {
//!     async fn on_event(&self, payload: &EventPayload) -> Result<(), ListenerError> {
//!         // write an audit record, etc.
//!         let _ = payload;
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "audit" } // prefer short, descriptive names
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::EventPayload;

/// Shared handle to a listener, as stored in the registry.
pub type ListenerRef = Arc<dyn Listen>;

/// Callback registered against an event name.
///
/// Invoked sequentially during dispatch with a shared reference to the
/// (post-middleware) payload. Implementations may suspend and may fail;
/// a failure is reported to the [`ErrorSink`](crate::ErrorSink) and does
/// not affect other listeners.
#[async_trait]
pub trait Listen: Send + Sync + 'static {
    /// Handles a single emitted event.
    ///
    /// Called in priority order within the emitting task. Errors are isolated;
    /// panics are caught and reported as
    /// [`ListenerError::Panicked`](crate::ListenerError::Panicked).
    async fn on_event(&self, payload: &EventPayload) -> Result<(), ListenerError>;

    /// Returns the listener name used in error-sink context.
    ///
    /// Prefer short, descriptive names (e.g., "audit", "metrics", "mailer").
    /// The default uses `type_name::<Self>()`, which can be verbose - override
    /// it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
