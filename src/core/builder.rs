use std::sync::Arc;

use crate::core::bus::EventBus;
use crate::core::config::BusConfig;
use crate::middleware::MiddlewareRef;
use crate::sinks::{ErrorSink, NoopSink};

/// Builder for constructing an [`EventBus`] with optional wiring.
pub struct BusBuilder {
    cfg: BusConfig,
    sink: Arc<dyn ErrorSink>,
    stages: Vec<MiddlewareRef>,
}

impl BusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BusConfig) -> Self {
        Self {
            cfg,
            sink: Arc::new(NoopSink),
            stages: Vec::new(),
        }
    }

    /// Sets the error sink invoked for every isolated listener failure.
    ///
    /// Defaults to [`NoopSink`].
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Appends a middleware stage. Stages run in the order they were added;
    /// more can be appended later via [`EventBus::middleware`].
    pub fn with_middleware(mut self, stage: MiddlewareRef) -> Self {
        self.stages.push(stage);
        self
    }

    /// Builds the bus: listener registry, middleware pipeline, history log.
    pub fn build(self) -> EventBus {
        EventBus::new_internal(self.cfg, self.sink, self.stages)
    }
}
