// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Curator configuration.
//!
//! Built once through the builder and immutable afterwards. The clock
//! defaults to the system clock and is overridable, which is what makes
//! the scheduler loop testable with virtual time.

use crate::context::ServiceMap;
use crate::error::CuratorError;
use crate::pipeline::CuratorPipeline;
use curator_core::{BoxError, Clock, SystemClock};
use std::sync::Arc;

/// Callback receiving failures from detached pipeline runs.
///
/// The scheduler never awaits a dispatched chain, so execution errors
/// surface here instead of an unobserved background channel.
pub type FailureHandler = Arc<dyn Fn(&str, &BoxError) + Send + Sync>;

pub(crate) fn log_failure_handler() -> FailureHandler {
    Arc::new(|pipeline, err| {
        tracing::error!(pipeline, error = %err, "pipeline task failed");
    })
}

/// Immutable configuration owned by a [`Curator`](crate::Curator).
pub struct CuratorConfig {
    clock: Arc<dyn Clock>,
    pipelines: Vec<CuratorPipeline>,
    services: Arc<ServiceMap>,
    on_failure: FailureHandler,
}

impl CuratorConfig {
    pub fn builder() -> CuratorConfigBuilder {
        CuratorConfigBuilder::default()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn pipelines(&self) -> &[CuratorPipeline] {
        &self.pipelines
    }

    pub fn services(&self) -> &Arc<ServiceMap> {
        &self.services
    }

    pub fn on_failure(&self) -> &FailureHandler {
        &self.on_failure
    }
}

/// Builder for [`CuratorConfig`].
pub struct CuratorConfigBuilder {
    clock: Arc<dyn Clock>,
    pipelines: Vec<CuratorPipeline>,
    services: ServiceMap,
    on_failure: FailureHandler,
}

impl Default for CuratorConfigBuilder {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            pipelines: Vec::new(),
            services: ServiceMap::new(),
            on_failure: log_failure_handler(),
        }
    }
}

impl CuratorConfigBuilder {
    /// Override the time source. Tests pass a fake clock here.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn services(mut self, services: ServiceMap) -> Self {
        self.services = services;
        self
    }

    /// Register a single shared dependency.
    pub fn service<T: Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.services.insert(service);
        self
    }

    /// Replace the default (tracing) failure handler.
    pub fn on_failure<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &BoxError) + Send + Sync + 'static,
    {
        self.on_failure = Arc::new(handler);
        self
    }

    /// Append a pipeline. Dispatch order within one poll tick follows
    /// due time, not registration order.
    pub fn pipeline(mut self, pipeline: CuratorPipeline) -> Self {
        self.pipelines.push(pipeline);
        self
    }

    pub fn build(self) -> Result<CuratorConfig, CuratorError> {
        for pipeline in &self.pipelines {
            if pipeline.name().trim().is_empty() {
                return Err(CuratorError::EmptyPipelineName);
            }
        }
        Ok(CuratorConfig {
            clock: self.clock,
            pipelines: self.pipelines,
            services: Arc::new(self.services),
            on_failure: self.on_failure,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
