// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource pipeline runner.
//!
//! Binds a middleware chain to a live resource stream. Runs are
//! serialized per stream: a resource's run must finish before the next
//! resource is taken. Runs for different streams are independent. A
//! task failure ends the subscription permanently: no retry, no
//! per-run isolation.

use crate::chain::{build_chain, task_fn, task_middleware, Middleware, PipelineTask, TaskDelegate};
use crate::config::{log_failure_handler, FailureHandler};
use crate::context::{ResourceContext, ServiceMap};
use crate::stream::ResourceStream;
use curator_core::BoxError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Ordered middleware task list for one resource type.
pub struct ResourcePipeline<T> {
    name: String,
    tasks: Vec<Middleware<ResourceContext<T>>>,
}

impl<T: Send + Sync + 'static> ResourcePipeline<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_task(&mut self, middleware: Middleware<ResourceContext<T>>) {
        self.tasks.push(middleware);
    }

    /// Fold the task list into a single entry point.
    pub fn build(&self) -> TaskDelegate<ResourceContext<T>> {
        build_chain(&self.tasks)
    }
}

/// Binds a [`ResourcePipeline`] to a stream and subscribes it.
pub struct ResourcePipelineBuilder<T> {
    pipeline: ResourcePipeline<T>,
    stream: ResourceStream<T>,
    services: Arc<ServiceMap>,
    on_failure: FailureHandler,
}

impl<T: Clone + Send + Sync + 'static> ResourcePipelineBuilder<T> {
    pub fn new(
        name: impl Into<String>,
        stream: ResourceStream<T>,
        services: Arc<ServiceMap>,
    ) -> Self {
        Self {
            pipeline: ResourcePipeline::new(name),
            stream,
            services,
            on_failure: log_failure_handler(),
        }
    }

    /// Replace the default (tracing) failure handler.
    pub fn on_failure<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &BoxError) + Send + Sync + 'static,
    {
        self.on_failure = Arc::new(handler);
        self
    }

    /// Append a middleware task factory.
    pub fn task<F>(mut self, middleware: F) -> Self
    where
        F: Fn(TaskDelegate<ResourceContext<T>>) -> TaskDelegate<ResourceContext<T>>
            + Send
            + Sync
            + 'static,
    {
        self.pipeline.add_task(Box::new(middleware));
        self
    }

    /// Append a plain closure as a pass-through task.
    pub fn task_fn<F>(mut self, action: F) -> Self
    where
        F: Fn(Arc<ResourceContext<T>>) + Send + Sync + 'static,
    {
        self.pipeline.add_task(task_fn(action));
        self
    }

    /// Append a [`PipelineTask`] instance.
    pub fn task_middleware<P>(mut self, task: Arc<P>) -> Self
    where
        P: PipelineTask<ResourceContext<T>> + 'static,
    {
        self.pipeline.add_task(task_middleware(task));
        self
    }

    /// Build the chain and start processing the stream.
    ///
    /// Each received resource gets a fresh context; the driver awaits
    /// the chain before taking the next resource. A chain failure is
    /// reported to the failure handler and ends the subscription for
    /// good.
    pub fn subscribe(self) -> PipelineSubscription {
        let chain = self.pipeline.build();
        let name = self.pipeline.name().to_string();
        let services = self.services;
        let on_failure = self.on_failure;
        let mut subscription = self.stream.subscribe();

        let driver = tokio::spawn(async move {
            while let Some(resource) = subscription.recv().await {
                let ctx = Arc::new(ResourceContext::new(Arc::clone(&services), resource));
                if let Err(err) = chain(ctx).await {
                    on_failure(&name, &err);
                    break;
                }
            }
        });

        PipelineSubscription { driver }
    }
}

impl<T: Clone + Send + Sync + 'static> ResourceStream<T> {
    /// Start a pipeline over this stream.
    pub fn pipeline(
        &self,
        name: impl Into<String>,
        services: Arc<ServiceMap>,
    ) -> ResourcePipelineBuilder<T> {
        ResourcePipelineBuilder::new(name, self.clone(), services)
    }
}

/// Handle to a running resource pipeline. Dropping it stops the driver
/// and releases the stream subscription.
pub struct PipelineSubscription {
    driver: JoinHandle<()>,
}

impl PipelineSubscription {
    /// False once the driver has exited (stream ended or a task
    /// failed).
    pub fn is_active(&self) -> bool {
        !self.driver.is_finished()
    }
}

impl Drop for PipelineSubscription {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[cfg(test)]
#[path = "resource_pipeline_tests.rs"]
mod tests;
