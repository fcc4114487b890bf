//! Error types used by the priobus dispatcher.
//!
//! This module defines three error enums with different propagation rules:
//!
//! - [`EmitError`] — errors that fail the whole emit (pipeline rejection, cancellation).
//! - [`ListenerError`] — errors raised by individual listener invocations.
//! - [`MiddlewareError`] — errors raised by pipeline stages.
//!
//! A failing middleware stage aborts the emit before any listener runs; a failing
//! listener is isolated, forwarded to the configured error sink, and never stops
//! the remaining dispatch. All types provide helper methods (`as_label`,
//! `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors that fail an emit as a whole.
///
/// These are the only errors returned from
/// [`EventBus::emit`](crate::EventBus::emit). When an emit fails this way, no
/// listener has observed the event and nothing was recorded in history,
/// except for [`EmitError::Cancelled`], which reports how far dispatch got.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EmitError {
    /// A middleware stage rejected the emit before dispatch.
    #[error("pipeline rejected emit at stage '{stage}': {source}")]
    Rejected {
        /// Name of the stage that stopped the pipeline.
        stage: String,
        /// The stage failure that caused the rejection.
        #[source]
        source: MiddlewareError,
    },

    /// The emit was abandoned via its cancellation token.
    ///
    /// Listeners invoked before cancellation (`delivered`) have already observed
    /// the event; once-cleanup has run for them.
    #[error("emit cancelled after {delivered} listener(s)")]
    Cancelled {
        /// Number of listeners invoked before cancellation was observed.
        delivered: usize,
    },
}

impl EmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use priobus::EmitError;
    ///
    /// let err = EmitError::Cancelled { delivered: 2 };
    /// assert_eq!(err.as_label(), "emit_cancelled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EmitError::Rejected { .. } => "emit_rejected",
            EmitError::Cancelled { .. } => "emit_cancelled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EmitError::Rejected { stage, source } => {
                format!("rejected by stage '{stage}': {}", source.as_message())
            }
            EmitError::Cancelled { delivered } => {
                format!("cancelled, {delivered} listener(s) already invoked")
            }
        }
    }

    /// Indicates whether this failure was an intentional pipeline gate.
    pub fn is_rejection(&self) -> bool {
        matches!(self, EmitError::Rejected { .. })
    }
}

/// # Errors produced by listener invocations.
///
/// Listener failures are isolated per listener: they are caught, forwarded to
/// the [`ErrorSink`](crate::ErrorSink), aggregated on the
/// [`EmitReport`](crate::EmitReport), and never stop the remaining dispatch.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Listener returned an error.
    #[error("listener failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Listener panicked; the panic was caught and dispatch continued.
    #[error("listener panicked: {info}")]
    Panicked {
        /// Captured panic payload, best effort.
        info: String,
    },
}

impl ListenerError {
    /// Shorthand for [`ListenerError::Fail`] from any displayable error.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        ListenerError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use priobus::ListenerError;
    ///
    /// let err = ListenerError::fail("boom");
    /// assert_eq!(err.as_label(), "listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Fail { .. } => "listener_failed",
            ListenerError::Panicked { .. } => "listener_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Fail { error } => format!("error: {error}"),
            ListenerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// True when the failure was a caught panic rather than a returned error.
    pub fn is_panic(&self) -> bool {
        matches!(self, ListenerError::Panicked { .. })
    }
}

/// # Errors produced by middleware stages.
///
/// Any stage failure aborts the emit before history and dispatch; the two
/// variants only distinguish an intentional gate from a stage malfunction.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MiddlewareError {
    /// The stage deliberately blocked delivery (validation/auth gate).
    #[error("rejected: {reason}")]
    Reject {
        /// Why the stage blocked the event.
        reason: String,
    },

    /// The stage itself failed.
    #[error("stage failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl MiddlewareError {
    /// Shorthand for [`MiddlewareError::Reject`].
    pub fn reject(reason: impl Into<String>) -> Self {
        MiddlewareError::Reject {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            MiddlewareError::Reject { .. } => "middleware_rejected",
            MiddlewareError::Fail { .. } => "middleware_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            MiddlewareError::Reject { reason } => format!("rejected: {reason}"),
            MiddlewareError::Fail { error } => format!("error: {error}"),
        }
    }
}
