// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::task_handle::TaskHandle;
use core::fmt::Debug;
use core::time::Duration;
use std::sync::Arc;

/// A one-shot callback.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A callback invoked once per period.
pub type PeriodicTask = Box<dyn FnMut() + Send + 'static>;

/// Runs time-deferred or periodic callbacks off the calling thread.
///
/// Contract shared by every implementation:
/// - after [`TaskHandle::cancel`] returns the callback is never invoked again,
///   though an invocation already in progress may finish
/// - invocations belonging to the same handle never overlap
/// - callbacks due at the same instant run in scheduling order
pub trait Scheduler: Send + Sync + Debug + 'static {
    /// Runs `task` once, `delay` from now.
    fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle;

    /// Runs `task` every `period`, the first time `period` from now.
    fn schedule_periodic(&self, period: Duration, task: PeriodicTask) -> TaskHandle;

    /// Time elapsed on this scheduler's clock since it was created.
    fn now(&self) -> Duration;
}

/// Shared, type-erased scheduler.
pub type SchedulerRef = Arc<dyn Scheduler>;

impl<S> Scheduler for Arc<S>
where
    S: Scheduler + ?Sized,
{
    fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
        (**self).schedule_after(delay, task)
    }

    fn schedule_periodic(&self, period: Duration, task: PeriodicTask) -> TaskHandle {
        (**self).schedule_periodic(period, task)
    }

    fn now(&self) -> Duration {
        (**self).now()
    }
}
