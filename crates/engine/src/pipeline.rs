// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduled pipeline: an ordered task list plus a cron trigger.

use crate::chain::{build_chain, task_fn, task_middleware, Middleware, PipelineTask, TaskDelegate};
use crate::context::TaskContext;
use chrono::{DateTime, Local};
use curator_core::{CronParseError, CronSchedule};
use std::sync::Arc;

/// One workflow unit owned by the curator.
///
/// The task list is append-only during configuration and immutable once
/// the owning configuration is built. The default schedule fires every
/// second.
pub struct CuratorPipeline {
    name: String,
    schedule: CronSchedule,
    tasks: Vec<Middleware<TaskContext>>,
}

impl CuratorPipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schedule: CronSchedule::every_second(),
            tasks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schedule(&self) -> &CronSchedule {
        &self.schedule
    }

    /// Set the trigger schedule from a six-field cron expression.
    /// Malformed expressions fail here, at configuration time.
    pub fn with_schedule(mut self, expr: &str) -> Result<Self, CronParseError> {
        self.schedule = CronSchedule::parse(expr)?;
        Ok(self)
    }

    pub fn with_cron(mut self, schedule: CronSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Append a middleware task factory.
    pub fn task<F>(mut self, middleware: F) -> Self
    where
        F: Fn(TaskDelegate<TaskContext>) -> TaskDelegate<TaskContext> + Send + Sync + 'static,
    {
        self.tasks.push(Box::new(middleware));
        self
    }

    /// Append a plain closure as a pass-through task.
    pub fn task_fn<F>(mut self, action: F) -> Self
    where
        F: Fn(Arc<TaskContext>) + Send + Sync + 'static,
    {
        self.tasks.push(task_fn(action));
        self
    }

    /// Append a [`PipelineTask`] instance.
    pub fn task_middleware<T>(mut self, task: Arc<T>) -> Self
    where
        T: PipelineTask<TaskContext> + 'static,
    {
        self.tasks.push(task_middleware(task));
        self
    }

    /// Fold the task list into a single entry point. Rebuilt on every
    /// run.
    pub fn build(&self) -> TaskDelegate<TaskContext> {
        build_chain(&self.tasks)
    }

    /// Next trigger instant strictly after `after`, in local time.
    pub fn next_run(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.next_occurrence(after, false)
    }

    pub(crate) fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
