//! # Simple logging sink for debugging and demos.
//!
//! [`LogSink`] prints listener failures to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [listener-failed] event=user.created listener=4c2f... err="listener failed: smtp down"
//! [listener-panicked] event=user.created listener=91aa... err="listener panicked: index out of bounds"
//! ```

use async_trait::async_trait;

use crate::core::ListenerId;
use crate::error::ListenerError;
use crate::sinks::sink::ErrorSink;

/// Simple stdout error sink.
///
/// Enabled via the `logging` feature. Prints one line per isolated listener
/// failure for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`ErrorSink`] for
/// structured logging or metrics collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ErrorSink for LogSink {
    async fn report(&self, event: &str, listener: ListenerId, error: &ListenerError) {
        let label = if error.is_panic() {
            "listener-panicked"
        } else {
            "listener-failed"
        };
        println!("[{label}] event={event} listener={listener} err={:?}", error.to_string());
    }
}
