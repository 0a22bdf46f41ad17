// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! curator-engine: scheduling and pipeline execution.
//!
//! The curator runs a poll loop that fires cron-scheduled pipelines;
//! resource pipelines bind a middleware chain to a shared, reference-
//! counted stream of resources pulled from a producer.

pub mod chain;
pub mod config;
pub mod context;
pub mod curator;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod resource_pipeline;
pub mod stream;

pub use chain::{build_chain, task_fn, task_middleware, Middleware, PipelineTask, TaskDelegate, TaskFuture};
pub use config::{CuratorConfig, CuratorConfigBuilder, FailureHandler};
pub use context::{Items, ResourceContext, ServiceMap, TaskContext};
pub use curator::Curator;
pub use error::{CuratorError, RegistryError};
pub use pipeline::CuratorPipeline;
pub use registry::{ProducerRegistry, ProducerRegistryBuilder};
pub use resource_pipeline::{PipelineSubscription, ResourcePipeline, ResourcePipelineBuilder};
pub use stream::{CronTicker, ResourceStream, Subscription};
