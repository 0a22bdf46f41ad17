// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scheduler specs: cron-triggered pipelines with shared
//! services, driven by a virtual clock.

use crate::prelude::{settle, test_clock, wait_until};
use async_trait::async_trait;
use curator_core::BoxError;
use curator_engine::{
    Curator, CuratorConfig, CuratorPipeline, PipelineTask, TaskContext, TaskDelegate,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared state the pipeline tasks report into.
#[derive(Default)]
struct Telemetry {
    counter: AtomicUsize,
    last_runs: Mutex<Vec<usize>>,
}

/// First task: bump the shared counter and stash the new value in the
/// context for the next task.
struct IncrementCounter;

#[async_trait]
impl PipelineTask<TaskContext> for IncrementCounter {
    async fn invoke(
        &self,
        ctx: Arc<TaskContext>,
        next: TaskDelegate<TaskContext>,
    ) -> Result<(), BoxError> {
        let telemetry = ctx
            .service::<Telemetry>()
            .ok_or("telemetry service missing")?;
        let count = telemetry.counter.fetch_add(1, Ordering::SeqCst) + 1;
        ctx.insert_item("run-count", count);
        next(ctx).await
    }
}

/// Second task: record the counter value it observed through the item
/// bag.
struct RecordLastRun;

#[async_trait]
impl PipelineTask<TaskContext> for RecordLastRun {
    async fn invoke(
        &self,
        ctx: Arc<TaskContext>,
        next: TaskDelegate<TaskContext>,
    ) -> Result<(), BoxError> {
        let telemetry = ctx
            .service::<Telemetry>()
            .ok_or("telemetry service missing")?;
        let count: usize = ctx.item("run-count").ok_or("run-count item missing")?;
        telemetry.last_runs.lock().push(count);
        next(ctx).await
    }
}

#[tokio::test]
async fn every_second_pipeline_fires_twice_in_two_and_a_half_seconds() {
    let clock = test_clock();
    let telemetry = Arc::new(Telemetry::default());

    let config = CuratorConfig::builder()
        .clock(Arc::new(clock.clone()))
        .service(Arc::clone(&telemetry))
        .pipeline(
            CuratorPipeline::new("heartbeat")
                .with_schedule("* * * * * *")
                .unwrap()
                .task_middleware(Arc::new(IncrementCounter))
                .task_middleware(Arc::new(RecordLastRun)),
        )
        .build()
        .unwrap();

    let curator = Curator::new(config);
    curator.start().unwrap();
    settle().await;

    // Advance 2.5 virtual seconds in one-second steps.
    clock.advance(Duration::from_secs(1));
    wait_until(|| telemetry.counter.load(Ordering::SeqCst) == 1).await;

    clock.advance(Duration::from_secs(1));
    wait_until(|| telemetry.counter.load(Ordering::SeqCst) == 2).await;

    clock.advance(Duration::from_millis(500));
    settle().await;

    curator.stop();
    settle().await;

    assert_eq!(telemetry.counter.load(Ordering::SeqCst), 2);
    assert_eq!(*telemetry.last_runs.lock(), vec![1, 2]);
}

#[tokio::test]
async fn pipelines_with_distinct_schedules_fire_independently() {
    let clock = test_clock();
    let fired = Arc::new(Mutex::new(Vec::new()));

    let every_second = Arc::clone(&fired);
    let every_five = Arc::clone(&fired);
    let config = CuratorConfig::builder()
        .clock(Arc::new(clock.clone()))
        .pipeline(
            CuratorPipeline::new("fast")
                .with_schedule("* * * * * *")
                .unwrap()
                .task_fn(move |_ctx| every_second.lock().push("fast")),
        )
        .pipeline(
            CuratorPipeline::new("slow")
                .with_schedule("*/5 * * * * *")
                .unwrap()
                .task_fn(move |_ctx| every_five.lock().push("slow")),
        )
        .build()
        .unwrap();

    let curator = Curator::new(config);
    curator.start().unwrap();
    settle().await;

    // 12:00:00.5 -> 12:00:01.5: only the per-second schedule matched.
    clock.advance(Duration::from_secs(1));
    wait_until(|| fired.lock().len() == 1).await;
    assert_eq!(*fired.lock(), vec!["fast"]);
    settle().await;

    // -> 12:00:05.5: both matched; the slower schedule's :05 due time
    // orders after the faster one's :02.
    clock.advance(Duration::from_secs(4));
    wait_until(|| fired.lock().len() == 3).await;

    curator.stop();
    assert_eq!(*fired.lock(), vec!["fast", "fast", "slow"]);
}

#[tokio::test]
async fn a_failing_pipeline_does_not_stall_the_scheduler() {
    let clock = test_clock();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let healthy_runs = Arc::new(AtomicUsize::new(0));

    let sink = Arc::clone(&failures);
    let healthy = Arc::clone(&healthy_runs);
    let config = CuratorConfig::builder()
        .clock(Arc::new(clock.clone()))
        .on_failure(move |pipeline, err| sink.lock().push(format!("{pipeline}: {err}")))
        .pipeline(CuratorPipeline::new("doomed").task(|_next| {
            Arc::new(|_ctx| -> curator_engine::TaskFuture {
                Box::pin(async { Err("connector offline".into()) })
            })
        }))
        .pipeline(CuratorPipeline::new("healthy").task_fn(move |_ctx| {
            healthy.fetch_add(1, Ordering::SeqCst);
        }))
        .build()
        .unwrap();

    let curator = Curator::new(config);
    curator.start().unwrap();
    settle().await;

    clock.advance(Duration::from_secs(1));
    wait_until(|| healthy_runs.load(Ordering::SeqCst) == 1).await;
    wait_until(|| failures.lock().len() == 1).await;

    // The failure was reported, and scheduling continued.
    clock.advance(Duration::from_secs(1));
    wait_until(|| healthy_runs.load(Ordering::SeqCst) == 2).await;

    curator.stop();
    assert_eq!(failures.lock()[0], "doomed: connector offline");
}
