//! # Middleware pipeline: ordered, sequential, gate-on-failure.
//!
//! [`MiddlewarePipeline`] holds the stages applied to every emitted payload
//! before history and dispatch.
//!
//! ## Rules
//! - Registration order is execution order.
//! - Stages run sequentially; each is awaited before the next starts.
//! - The first failing stage stops the pipeline; the failure reaches the
//!   emitter as [`EmitError::Rejected`] and no listener observes the event.
//! - Structural mutation (`push`) serializes against `run` via an `RwLock`;
//!   `run` iterates over a snapshot, so pushing a stage mid-emit does not
//!   affect that emit.

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::EmitError;
use crate::events::EventPayload;
use crate::middleware::middleware::MiddlewareRef;

/// Ordered sequence of middleware stages.
#[derive(Default)]
pub struct MiddlewarePipeline {
    stages: RwLock<Vec<MiddlewareRef>>,
}

impl MiddlewarePipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pipeline pre-populated with stages, in order.
    pub(crate) fn from_stages(stages: Vec<MiddlewareRef>) -> Self {
        Self {
            stages: RwLock::new(stages),
        }
    }

    /// Appends a stage. It will run after every stage registered before it.
    pub async fn push(&self, stage: MiddlewareRef) {
        self.stages.write().await.push(stage);
    }

    /// Number of registered stages.
    pub async fn len(&self) -> usize {
        self.stages.read().await.len()
    }

    /// True if no stages are registered.
    pub async fn is_empty(&self) -> bool {
        self.stages.read().await.is_empty()
    }

    /// Runs the payload through every stage sequentially.
    ///
    /// The cancellation token is checked between stages; a stage already
    /// running is never interrupted. On rejection the payload is dropped and
    /// the emit fails before history and dispatch.
    pub async fn run(
        &self,
        mut payload: EventPayload,
        cancel: &CancellationToken,
    ) -> Result<EventPayload, EmitError> {
        let stages: Vec<MiddlewareRef> = self.stages.read().await.clone();

        for stage in &stages {
            if cancel.is_cancelled() {
                return Err(EmitError::Cancelled { delivered: 0 });
            }
            payload = stage
                .handle(payload)
                .await
                .map_err(|source| EmitError::Rejected {
                    stage: stage.name().to_string(),
                    source,
                })?;
        }

        Ok(payload)
    }
}
