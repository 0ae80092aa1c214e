// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Scheduler driven by a manually advanced clock.
//!
//! Nothing runs until the owner advances time; callbacks then run on the
//! advancing thread in deadline order, ties broken by scheduling order. This
//! makes races between delayed sources fully deterministic.
//!
//! ```
//! use backflux_runtime::{Scheduler, VirtualTimeScheduler};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let scheduler = VirtualTimeScheduler::new();
//! let ticks = Arc::new(AtomicUsize::new(0));
//! let counter = ticks.clone();
//! let handle = scheduler.schedule_periodic(
//!     Duration::from_millis(100),
//!     Box::new(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }),
//! );
//!
//! scheduler.advance_by(Duration::from_millis(350));
//! assert_eq!(ticks.load(Ordering::SeqCst), 3);
//!
//! handle.cancel();
//! scheduler.advance_by(Duration::from_secs(1));
//! assert_eq!(ticks.load(Ordering::SeqCst), 3);
//! assert_eq!(scheduler.pending_tasks(), 0);
//! ```

use crate::scheduler::{PeriodicTask, Scheduler, Task};
use crate::task_handle::TaskHandle;
use core::fmt;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

enum Job {
    Once(Task),
    Periodic { period: Duration, task: PeriodicTask },
}

struct Entry {
    id: u64,
    handle: TaskHandle,
    job: Job,
}

#[derive(Default)]
struct VirtualState {
    now: Duration,
    next_seq: u64,
    next_id: u64,
    // Keyed by (deadline, scheduling sequence).
    queue: BTreeMap<(Duration, u64), Entry>,
}

impl VirtualState {
    fn insert(&mut self, deadline: Duration, entry: Entry) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((deadline, seq), entry);
    }
}

/// Deterministic scheduler for tests. Clones share the same clock.
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler {
    state: Arc<Mutex<VirtualState>>,
}

impl VirtualTimeScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `delta`, running every callback that falls due.
    pub fn advance_by(&self, delta: Duration) {
        let target = self.now() + delta;
        self.advance_to(target);
    }

    /// Moves the clock to `target` (never backwards), running every callback
    /// due at or before it.
    pub fn advance_to(&self, target: Duration) {
        loop {
            let next = {
                let mut state = self.state.lock();
                let due = matches!(
                    state.queue.first_key_value(),
                    Some((&(deadline, _), _)) if deadline <= target
                );
                if due {
                    state.queue.pop_first()
                } else {
                    state.now = state.now.max(target);
                    None
                }
            };

            let Some(((deadline, _), entry)) = next else {
                break;
            };
            self.run(deadline, entry);
        }
    }

    /// Runs callbacks already due at the current instant.
    pub fn trigger_actions(&self) {
        self.advance_by(Duration::ZERO);
    }

    /// Number of callbacks still queued.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn run(&self, deadline: Duration, entry: Entry) {
        {
            let mut state = self.state.lock();
            state.now = state.now.max(deadline);
        }
        if entry.handle.is_cancelled() {
            return;
        }

        let Entry { id, handle, job } = entry;
        match job {
            Job::Once(task) => task(),
            Job::Periodic { period, mut task } => {
                task();
                if !handle.is_cancelled() {
                    let mut state = self.state.lock();
                    state.insert(
                        deadline + period,
                        Entry {
                            id,
                            handle,
                            job: Job::Periodic { period, task },
                        },
                    );
                }
            }
        }
    }

    fn schedule(&self, delay: Duration, job: Job) -> TaskHandle {
        let handle = TaskHandle::new();
        let id = {
            let mut state = self.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            let deadline = state.now + delay;
            state.insert(
                deadline,
                Entry {
                    id,
                    handle: handle.clone(),
                    job,
                },
            );
            id
        };

        let state: Weak<Mutex<VirtualState>> = Arc::downgrade(&self.state);
        handle.on_cancel(move || {
            if let Some(state) = state.upgrade() {
                // Dropping the entry releases everything the callback captured.
                let removed: Vec<Entry> = {
                    let mut state = state.lock();
                    let keys: Vec<_> = state
                        .queue
                        .iter()
                        .filter(|(_, entry)| entry.id == id)
                        .map(|(key, _)| *key)
                        .collect();
                    keys.iter()
                        .filter_map(|key| state.queue.remove(key))
                        .collect()
                };
                drop(removed);
            }
        });
        handle
    }
}

impl Scheduler for VirtualTimeScheduler {
    fn schedule_after(&self, delay: Duration, task: Task) -> TaskHandle {
        self.schedule(delay, Job::Once(task))
    }

    fn schedule_periodic(&self, period: Duration, task: PeriodicTask) -> TaskHandle {
        if period.is_zero() {
            warn!("periodic task scheduled with a zero period: using 1ns");
        }
        let period = period.max(Duration::from_nanos(1));
        self.schedule(period, Job::Periodic { period, task })
    }

    fn now(&self) -> Duration {
        self.state.lock().now
    }
}

impl fmt::Debug for VirtualTimeScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("VirtualTimeScheduler")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}
