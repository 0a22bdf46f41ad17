// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Middleware chain builder.
//!
//! A pipeline's task list is an ordered sequence of factories, each
//! taking the next continuation and returning a new one. Building folds
//! the list right-to-left so the first task registered executes first,
//! and every task decides whether and when to call onward. Both the
//! curator's scheduled pipelines and resource-bound pipelines share
//! this fold; only the context type differs.

use async_trait::async_trait;
use curator_core::BoxError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by one chain invocation.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;

/// A built chain entry point, or the continuation handed to a task.
pub type TaskDelegate<C> = Arc<dyn Fn(Arc<C>) -> TaskFuture + Send + Sync>;

/// A middleware task factory: wraps the next continuation.
pub type Middleware<C> = Box<dyn Fn(TaskDelegate<C>) -> TaskDelegate<C> + Send + Sync>;

/// Fold an ordered task list into a single callable continuation.
///
/// Seeds with a terminal continuation that does nothing and completes
/// successfully, then folds in reverse: registration order equals
/// execution order. The terminal only runs if the last task calls its
/// continuation.
pub fn build_chain<C: Send + Sync + 'static>(tasks: &[Middleware<C>]) -> TaskDelegate<C> {
    let mut chain: TaskDelegate<C> = Arc::new(|_ctx: Arc<C>| -> TaskFuture {
        Box::pin(async { Ok(()) })
    });
    for task in tasks.iter().rev() {
        chain = task(chain);
    }
    chain
}

/// A unit of pipeline work.
///
/// Implementations must eventually call `next(ctx)` unless they
/// intentionally short-circuit the rest of the chain, and must propagate
/// failures from awaited work.
#[async_trait]
pub trait PipelineTask<C: Send + Sync>: Send + Sync {
    async fn invoke(&self, ctx: Arc<C>, next: TaskDelegate<C>) -> Result<(), BoxError>;
}

/// Adapt a [`PipelineTask`] into a middleware factory.
///
/// The task instance is created by the caller and shared across runs;
/// there is no container-driven activation.
pub fn task_middleware<C, T>(task: Arc<T>) -> Middleware<C>
where
    C: Send + Sync + 'static,
    T: PipelineTask<C> + 'static,
{
    Box::new(move |next: TaskDelegate<C>| {
        let task = Arc::clone(&task);
        Arc::new(move |ctx: Arc<C>| -> TaskFuture {
            let task = Arc::clone(&task);
            let next = Arc::clone(&next);
            Box::pin(async move { task.invoke(ctx, next).await })
        })
    })
}

/// Wrap a plain closure as a pass-through task: it runs against the
/// context, then the chain continues.
pub fn task_fn<C, F>(action: F) -> Middleware<C>
where
    C: Send + Sync + 'static,
    F: Fn(Arc<C>) + Send + Sync + 'static,
{
    let action = Arc::new(action);
    Box::new(move |next: TaskDelegate<C>| {
        let action = Arc::clone(&action);
        Arc::new(move |ctx: Arc<C>| -> TaskFuture {
            action(Arc::clone(&ctx));
            next(ctx)
        })
    })
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod tests;
