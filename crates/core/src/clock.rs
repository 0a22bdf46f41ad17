// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for scheduling.
//!
//! The scheduler poll loop and producer tick sources never touch wall
//! time directly; they go through [`Clock`] so tests can drive them with
//! a deterministic [`FakeClock`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Source of the current instant and of timed waits.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Suspend until `duration` has elapsed on this clock.
    async fn sleep(&self, duration: Duration);
}

/// Production clock: wall time plus tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Deterministic clock for tests.
///
/// Time only moves when [`advance`](FakeClock::advance) is called;
/// pending sleeps resolve once the held instant passes their deadline.
/// No real time is involved.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<FakeClockInner>,
}

struct FakeClockInner {
    now: Mutex<DateTime<Utc>>,
    tick: Notify,
}

impl FakeClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(FakeClockInner {
                now: Mutex::new(start),
                tick: Notify::new(),
            }),
        }
    }

    /// Move the clock forward and wake every pending sleep.
    pub fn advance(&self, duration: Duration) {
        let delta = chrono::Duration::milliseconds(duration.as_millis() as i64);
        {
            let mut now = self.inner.now.lock();
            *now += delta;
        }
        self.inner.tick.notify_waiters();
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.inner.now.lock()
    }

    async fn sleep(&self, duration: Duration) {
        let delta = chrono::Duration::milliseconds(duration.as_millis() as i64);
        let deadline = self.now() + delta;
        loop {
            // Register for the wakeup before checking, so an advance that
            // lands between the check and the await is not lost.
            let mut notified = std::pin::pin!(self.inner.tick.notified());
            notified.as_mut().enable();
            if self.now() >= deadline {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
