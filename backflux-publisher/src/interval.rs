// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Periodic tick source.
//!
//! [`interval`] emits `0, 1, 2, ...` once per period on a [`Scheduler`]. The
//! first tick fires one full period after subscription. Ticks are never
//! buffered: a tick that finds no outstanding demand terminates the
//! subscription with [`BackfluxError::Overflow`].
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::interval_take;
//! use backflux_runtime::VirtualTimeScheduler;
//! use backflux_test_utils::TestSubscriber;
//! use std::time::Duration;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let scheduler = VirtualTimeScheduler::new();
//! let subscriber = TestSubscriber::unbounded();
//! interval_take(Duration::from_millis(100), 3, scheduler.clone())
//!     .subscribe(subscriber.boxed())?;
//!
//! scheduler.advance_by(Duration::from_millis(250));
//! assert_eq!(subscriber.items(), vec![0, 1]);
//!
//! scheduler.advance_by(Duration::from_millis(100));
//! assert_eq!(subscriber.items(), vec![0, 1, 2]);
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```

use crate::take::Take;
use backflux_core::{
    validate_demand, BackfluxError, BoxSubscriber, Demand, Publisher, Result,
    SerializedSubscriber, Subscription, SubscriptionRef,
};
use backflux_runtime::{Scheduler, SchedulerRef, TaskHandle};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Unbounded periodic counter. See [`interval`].
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    scheduler: SchedulerRef,
}

/// Emits an increasing counter every `period`, forever.
pub fn interval(period: Duration, scheduler: impl Scheduler) -> Interval {
    Interval {
        period,
        scheduler: Arc::new(scheduler),
    }
}

/// Emits `0..count` every `period`, then completes.
///
/// Completion follows the last tick immediately and stops the timer.
pub fn interval_take(
    period: Duration,
    count: u64,
    scheduler: impl Scheduler,
) -> Take<Interval, u64> {
    Take::new(interval(period, scheduler), count)
}

impl Publisher<u64> for Interval {
    fn subscribe(&self, subscriber: BoxSubscriber<u64>) -> Result<()> {
        let downstream = SerializedSubscriber::new(subscriber);
        let ticker = Arc::new(Ticker {
            demand: Demand::new(),
            count: AtomicU64::new(0),
            timer: Mutex::new(TimerSlot::Pending),
            downstream: downstream.clone(),
        });
        downstream.on_subscribe(ticker.clone() as SubscriptionRef);

        let tick = ticker.clone();
        let handle = self
            .scheduler
            .schedule_periodic(self.period, Box::new(move || tick.tick()));
        ticker.arm(handle);
        Ok(())
    }
}

enum TimerSlot {
    Pending,
    Armed(TaskHandle),
    Stopped,
}

struct Ticker {
    demand: Demand,
    count: AtomicU64,
    timer: Mutex<TimerSlot>,
    downstream: SerializedSubscriber<u64>,
}

impl Ticker {
    fn arm(&self, handle: TaskHandle) {
        let mut timer = self.timer.lock();
        if matches!(*timer, TimerSlot::Pending) {
            *timer = TimerSlot::Armed(handle);
            return;
        }
        drop(timer);
        handle.cancel();
    }

    fn stop(&self) {
        let previous = std::mem::replace(&mut *self.timer.lock(), TimerSlot::Stopped);
        if let TimerSlot::Armed(handle) = previous {
            handle.cancel();
        }
    }

    fn tick(&self) {
        if self.downstream.is_closed() {
            return;
        }
        let n = self.count.fetch_add(1, Ordering::AcqRel);
        if self.demand.try_take() {
            self.downstream.next(n);
            return;
        }

        warn!("interval tick {} dropped: no outstanding demand", n);
        self.stop();
        self.downstream.error(BackfluxError::overflow(format!(
            "could not emit tick {n} due to lack of requests"
        )));
    }
}

impl Subscription for Ticker {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        self.demand.add(n);
        Ok(())
    }

    fn cancel(&self) {
        self.stop();
        self.downstream.cancel();
    }
}
