// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler poll loop.
//!
//! The curator polls once per second: it computes every pipeline's next
//! due time from the previous tick watermark, fires all that are due in
//! ascending due-time order, then advances the watermark. Dispatched
//! chains run detached; the loop never waits on them, so a slow
//! pipeline cannot delay scheduling.

use crate::config::CuratorConfig;
use crate::context::TaskContext;
use crate::error::CuratorError;
use crate::pipeline::CuratorPipeline;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Owns a set of scheduled pipelines and the loop that fires them.
pub struct Curator {
    config: Arc<CuratorConfig>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl Curator {
    pub fn new(config: CuratorConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: Mutex::new(None),
        }
    }

    /// Start the poll loop.
    ///
    /// The previous-tick watermark is snapshotted before the loop task
    /// is spawned, so occurrences between `start` and the first poll are
    /// credited. Errors if already running.
    pub fn start(&self) -> Result<(), CuratorError> {
        let mut guard = self.shutdown.lock();
        if guard.is_some() {
            return Err(CuratorError::AlreadyRunning);
        }

        let (tx, rx) = watch::channel(false);
        *guard = Some(tx);

        let config = Arc::clone(&self.config);
        let prev_tick = config.clock().now().with_timezone(&Local);
        tokio::spawn(run_loop(config, prev_tick, rx));
        Ok(())
    }

    /// Signal the loop to stop. Idempotent; the loop observes the signal
    /// at the next poll boundary (worst case one poll interval later).
    /// In-flight pipeline runs are not cancelled.
    pub fn stop(&self) {
        let mut guard = self.shutdown.lock();
        if let Some(tx) = guard.take() {
            let _ = tx.send(true);
        }
    }
}

impl Drop for Curator {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(
    config: Arc<CuratorConfig>,
    mut prev_tick: DateTime<Local>,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::debug!(pipelines = config.pipelines().len(), "curator loop started");

    while !*shutdown.borrow() {
        let now = config.clock().now().with_timezone(&Local);

        let mut due: Vec<(Option<DateTime<Local>>, &CuratorPipeline)> = config
            .pipelines()
            .iter()
            .map(|pipeline| (pipeline.next_run(prev_tick), pipeline))
            .collect();
        // Stable ascending sort; pipelines without a due time order
        // first and stop the scan below without firing.
        due.sort_by(|a, b| a.0.cmp(&b.0));

        for (next_run, pipeline) in due {
            match next_run {
                None => break,
                Some(due_at) if due_at < now => dispatch(&config, pipeline),
                Some(_) => {}
            }
        }

        // Credit-once: a schedule that would have fired several times
        // since the previous poll gets exactly one dispatch.
        prev_tick = now;

        let sleep = config.clock().sleep(POLL_INTERVAL);
        tokio::select! {
            _ = shutdown.changed() => {}
            _ = sleep => {}
        }
    }

    tracing::debug!("curator loop stopped");
}

fn dispatch(config: &Arc<CuratorConfig>, pipeline: &CuratorPipeline) {
    tracing::debug!(pipeline = pipeline.name(), "dispatching pipeline run");

    let chain = pipeline.build();
    let ctx = Arc::new(TaskContext::new(Arc::clone(config.services())));
    let name = pipeline.name().to_string();
    let on_failure = Arc::clone(config.on_failure());

    // The chain is invoked here so its synchronous prefix runs in
    // dispatch order; the rest is detached and never awaited by the
    // loop.
    let run = chain(ctx);
    tokio::spawn(async move {
        if let Err(err) = run.await {
            on_failure(&name, &err);
        }
    });
}

#[cfg(test)]
#[path = "curator_tests.rs"]
mod tests;
