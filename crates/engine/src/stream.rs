// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron tick source and shared resource streams.
//!
//! A resource stream is hot and reference counted: the first subscriber
//! starts the background pump that ticks the producer's schedule and
//! pulls one resource per tick; the last unsubscribe tears the pump
//! down. Subscribers share pulls: a tick pulls once no matter how many
//! subscriptions exist.

use chrono::{DateTime, Utc};
use curator_core::{Clock, CronSchedule, Resource, ResourceProducer};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Turns a cron schedule into a sequence of tick instants.
///
/// The first tick resolves immediately: it marks the epoch of the
/// sequence and carries no elapsed interval, so callers skip it. Every
/// later tick suspends on the clock until the next UTC occurrence.
pub struct CronTicker {
    schedule: CronSchedule,
    clock: Arc<dyn Clock>,
    started: bool,
}

impl CronTicker {
    pub fn new(schedule: CronSchedule, clock: Arc<dyn Clock>) -> Self {
        Self {
            schedule,
            clock,
            started: false,
        }
    }

    /// Wait for and return the next tick instant. `None` means the
    /// schedule can never fire again.
    pub async fn tick(&mut self) -> Option<DateTime<Utc>> {
        if !self.started {
            self.started = true;
            return Some(self.clock.now());
        }

        let now = self.clock.now();
        let next = self.schedule.next_occurrence(now, false)?;
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        self.clock.sleep(wait).await;
        Some(next)
    }
}

/// Hot, shared stream of resources pulled from one producer.
///
/// Clones share the same underlying state; subscriptions from any clone
/// feed off the same pump.
pub struct ResourceStream<T> {
    inner: Arc<StreamInner<T>>,
}

impl<T> Clone for ResourceStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for ResourceStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStream").finish_non_exhaustive()
    }
}

struct StreamInner<T> {
    producer: Arc<dyn ResourceProducer<T>>,
    clock: Arc<dyn Clock>,
    state: Mutex<ShareState<T>>,
}

struct ShareState<T> {
    subscribers: Vec<(u64, mpsc::UnboundedSender<Resource<T>>)>,
    next_id: u64,
    pump: Option<JoinHandle<()>>,
}

impl<T: Clone + Send + Sync + 'static> ResourceStream<T> {
    pub fn new(producer: Arc<dyn ResourceProducer<T>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(StreamInner {
                producer,
                clock,
                state: Mutex::new(ShareState {
                    subscribers: Vec::new(),
                    next_id: 0,
                    pump: None,
                }),
            }),
        }
    }

    /// The producer feeding this stream.
    pub fn producer(&self) -> Arc<dyn ResourceProducer<T>> {
        Arc::clone(&self.inner.producer)
    }

    /// Subscribe to the stream, activating the pump if this is the
    /// first live subscription. The subscription ends when the returned
    /// handle is dropped or the stream faults.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.inner.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, tx));

        if state.pump.is_none() {
            tracing::debug!(
                producer = self.inner.producer.name(),
                "resource stream activated"
            );
            state.pump = Some(tokio::spawn(pump(Arc::clone(&self.inner))));
        }

        Subscription {
            receiver: rx,
            id,
            inner: Arc::clone(&self.inner),
        }
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.inner.state.lock().subscribers.len()
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.inner.state.lock().pump.is_some()
    }
}

/// Background loop: skip the epoch tick, then pull once per tick and
/// fan the resource out to every live subscriber. A pull failure faults
/// the stream: the pump exits and every subscriber channel closes.
async fn pump<T: Clone + Send + Sync + 'static>(inner: Arc<StreamInner<T>>) {
    let mut ticker = CronTicker::new(inner.producer.schedule().clone(), Arc::clone(&inner.clock));

    // Epoch tick: a sentinel with no meaningful elapsed interval. Never
    // triggers a pull.
    if ticker.tick().await.is_none() {
        fault(&inner);
        return;
    }

    loop {
        if ticker.tick().await.is_none() {
            break;
        }

        let resource = match inner.producer.pull().await {
            Ok(resource) => resource,
            Err(err) => {
                tracing::error!(
                    producer = inner.producer.name(),
                    error = %err,
                    "resource pull failed; stream faulted"
                );
                break;
            }
        };

        let mut state = inner.state.lock();
        state
            .subscribers
            .retain(|(_, tx)| tx.send(resource.clone()).is_ok());
    }

    fault(&inner);
}

fn fault<T>(inner: &Arc<StreamInner<T>>) {
    let mut state = inner.state.lock();
    state.subscribers.clear();
    state.pump = None;
}

/// One live subscription to a [`ResourceStream`].
///
/// Dropping it unsubscribes; the last drop deactivates the pump.
pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<Resource<T>>,
    id: u64,
    inner: Arc<StreamInner<T>>,
}

impl<T> Subscription<T> {
    /// Receive the next resource. `None` when the stream has faulted or
    /// been torn down.
    pub async fn recv(&mut self) -> Option<Resource<T>> {
        self.receiver.recv().await
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.subscribers.retain(|(id, _)| *id != self.id);
        if state.subscribers.is_empty() {
            if let Some(pump) = state.pump.take() {
                pump.abort();
                tracing::debug!("resource stream deactivated");
            }
        }
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
