// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::scheduler::{PeriodicTask, Scheduler, Task};
use crate::task_handle::TaskHandle;
use backflux_core::{BackfluxError, Result};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

/// Real-time scheduler backed by tokio timers.
///
/// Each scheduled callback runs on its own spawned task; cancelling the
/// handle aborts that task, which releases its timer.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
    origin: Instant,
}

impl TokioScheduler {
    /// Binds to the ambient tokio runtime.
    ///
    /// # Errors
    /// Returns [`BackfluxError::IllegalState`] when called outside a tokio runtime.
    pub fn new() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| BackfluxError::illegal_state(format!("no tokio runtime: {e}")))?;
        Ok(Self::with_handle(handle))
    }

    /// Binds to an explicit runtime handle.
    #[must_use]
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            origin: Instant::now(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let guard = handle.clone();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if !guard.is_cancelled() {
                task();
            }
        });
        handle.on_cancel(move || join.abort());
        handle
    }

    fn schedule_periodic(&self, period: Duration, mut task: PeriodicTask) -> TaskHandle {
        let period = if period.is_zero() {
            warn!("periodic task scheduled with a zero period: using 1ns");
            Duration::from_nanos(1)
        } else {
            period
        };

        let handle = TaskHandle::new();
        let guard = handle.clone();
        let join = self.handle.spawn(async move {
            let Some(start) = Instant::now().checked_add(period) else {
                warn!("periodic task period {:?} is beyond the timer range: never firing", period);
                std::future::pending::<()>().await;
                return;
            };
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if guard.is_cancelled() {
                    break;
                }
                task();
            }
        });
        handle.on_cancel(move || join.abort());
        handle
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
