// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-shifting operators driven by a [`Scheduler`].
//!
//! - [`delay_subscription`](DelayExt::delay_subscription) postpones the
//!   subscription to the upstream. The downstream receives `on_subscribe`
//!   immediately and may request right away; that demand is replayed once the
//!   upstream is subscribed.
//! - [`delay_elements`](DelayExt::delay_elements) fetches items one at a time
//!   and emits each of them `period` after it arrived. Completion waits for
//!   the last delayed item; errors are forwarded at once.
//!
//! Cancelling either operator also cancels its pending timer.
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::{just, DelayExt};
//! use backflux_runtime::VirtualTimeScheduler;
//! use backflux_test_utils::TestSubscriber;
//! use std::time::Duration;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let scheduler = VirtualTimeScheduler::new();
//! let subscriber = TestSubscriber::unbounded();
//! just(["walter", "jesse"])
//!     .delay_elements(Duration::from_millis(250), scheduler.clone())
//!     .subscribe(subscriber.boxed())?;
//!
//! scheduler.advance_by(Duration::from_millis(250));
//! assert_eq!(subscriber.items(), vec!["walter"]);
//!
//! scheduler.advance_by(Duration::from_millis(250));
//! assert_eq!(subscriber.items(), vec!["walter", "jesse"]);
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```

use crate::relay::Relay;
use backflux_core::{
    request_upstream, validate_demand, BackfluxError, BoxSubscriber, Demand, Publisher, Result,
    SerializedSubscriber, Subscriber, Subscription, SubscriptionRef, SubscriptionSlot,
};
use backflux_runtime::{Scheduler, SchedulerRef, TaskHandle};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait providing the time-shifting operators.
pub trait DelayExt<T>: Publisher<T> + Sized + 'static {
    /// Subscribes to the upstream only after `delay` has elapsed.
    fn delay_subscription(
        self,
        delay: Duration,
        scheduler: impl Scheduler,
    ) -> DelaySubscription<Self, T>;

    /// Shifts every item by `period`, keeping at most one item in flight.
    fn delay_elements(
        self,
        period: Duration,
        scheduler: impl Scheduler,
    ) -> DelayElements<Self, T>;
}

impl<P, T> DelayExt<T> for P
where
    P: Publisher<T> + 'static,
    T: Send + 'static,
{
    fn delay_subscription(
        self,
        delay: Duration,
        scheduler: impl Scheduler,
    ) -> DelaySubscription<Self, T> {
        DelaySubscription {
            upstream: Arc::new(self),
            delay,
            scheduler: Arc::new(scheduler),
            _marker: PhantomData,
        }
    }

    fn delay_elements(
        self,
        period: Duration,
        scheduler: impl Scheduler,
    ) -> DelayElements<Self, T> {
        DelayElements {
            upstream: self,
            period,
            scheduler: Arc::new(scheduler),
            _marker: PhantomData,
        }
    }
}

/// Publisher returned by [`DelayExt::delay_subscription`].
pub struct DelaySubscription<P, T> {
    upstream: Arc<P>,
    delay: Duration,
    scheduler: SchedulerRef,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T> Publisher<T> for DelaySubscription<P, T>
where
    P: Publisher<T> + 'static,
    T: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        let relay = Relay::new(subscriber);
        relay.open();

        let upstream = self.upstream.clone();
        let pending = relay.clone();
        let handle = self.scheduler.schedule_after(
            self.delay,
            Box::new(move || {
                if pending.upstream.is_cancelled() {
                    return;
                }
                trace!("delayed subscription firing");
                let forward = Forward {
                    relay: pending.clone(),
                };
                if let Err(error) = upstream.subscribe(Box::new(forward)) {
                    pending.fail(error);
                }
            }),
        );
        relay.hold_timer(handle);
        Ok(())
    }
}

struct Forward<T> {
    relay: Arc<Relay<T>>,
}

impl<T: Send + 'static> Subscriber<T> for Forward<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.relay.upstream.set(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.relay.downstream.next(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.relay.downstream.error(error);
    }

    fn on_complete(&mut self) {
        self.relay.downstream.complete();
    }
}

/// Publisher returned by [`DelayExt::delay_elements`].
pub struct DelayElements<P, T> {
    upstream: P,
    period: Duration,
    scheduler: SchedulerRef,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T> Publisher<T> for DelayElements<P, T>
where
    P: Publisher<T> + 'static,
    T: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        let state = Arc::new(DelayState {
            downstream: SerializedSubscriber::new(subscriber),
            upstream: SubscriptionSlot::new(),
            demand: Demand::new(),
            scheduler: self.scheduler.clone(),
            period: self.period,
            flow: Mutex::new(Flow::default()),
        });
        self.upstream.subscribe(Box::new(DelayElementsSubscriber { state }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Requested,
    Delaying(u64),
}

struct Flow {
    phase: Phase,
    generation: u64,
    timer: Option<TaskHandle>,
    upstream_done: bool,
    cancelled: bool,
}

impl Default for Flow {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            timer: None,
            upstream_done: false,
            cancelled: false,
        }
    }
}

struct DelayState<T> {
    downstream: SerializedSubscriber<T>,
    upstream: SubscriptionSlot,
    demand: Demand,
    scheduler: SchedulerRef,
    period: Duration,
    flow: Mutex<Flow>,
}

impl<T: Send + 'static> DelayState<T> {
    /// Asks the upstream for the next item if nothing is in flight and the
    /// downstream still has demand.
    fn pull(&self) {
        {
            let mut flow = self.flow.lock();
            if flow.phase != Phase::Idle
                || flow.upstream_done
                || flow.cancelled
                || self.demand.current() == 0
            {
                return;
            }
            flow.phase = Phase::Requested;
        }
        request_upstream(&self.upstream, 1);
    }

    fn delay(self: &Arc<Self>, item: T) {
        let generation = {
            let mut flow = self.flow.lock();
            if flow.cancelled {
                return;
            }
            flow.generation += 1;
            flow.phase = Phase::Delaying(flow.generation);
            flow.generation
        };

        let state = self.clone();
        let handle = self.scheduler.schedule_after(
            self.period,
            Box::new(move || state.release(generation, item)),
        );

        let mut flow = self.flow.lock();
        if flow.cancelled {
            drop(flow);
            handle.cancel();
        } else if flow.phase == Phase::Delaying(generation) {
            flow.timer = Some(handle);
        }
    }

    fn release(&self, generation: u64, item: T) {
        let complete = {
            let mut flow = self.flow.lock();
            if flow.cancelled || flow.phase != Phase::Delaying(generation) {
                return;
            }
            flow.phase = Phase::Idle;
            flow.timer = None;
            flow.upstream_done
        };
        self.demand.try_take();
        self.downstream.next(item);
        if complete {
            self.downstream.complete();
        } else {
            self.pull();
        }
    }

    fn stop(&self) {
        let timer = {
            let mut flow = self.flow.lock();
            flow.cancelled = true;
            flow.timer.take()
        };
        if let Some(timer) = timer {
            timer.cancel();
        }
    }
}

impl<T: Send + 'static> Subscription for DelayState<T> {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        self.demand.add(n);
        self.pull();
        Ok(())
    }

    fn cancel(&self) {
        self.stop();
        self.upstream.cancel();
        self.downstream.cancel();
    }
}

struct DelayElementsSubscriber<T> {
    state: Arc<DelayState<T>>,
}

impl<T: Send + 'static> Subscriber<T> for DelayElementsSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.upstream.set(subscription);
        self.state
            .downstream
            .on_subscribe(self.state.clone() as SubscriptionRef);
    }

    fn on_next(&mut self, item: T) {
        self.state.delay(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.state.stop();
        self.state.downstream.error(error);
    }

    fn on_complete(&mut self) {
        {
            let mut flow = self.state.flow.lock();
            flow.upstream_done = true;
            if matches!(flow.phase, Phase::Delaying(_)) {
                return;
            }
        }
        self.state.downstream.complete();
    }
}
