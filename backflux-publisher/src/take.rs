// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Take operator - limits a publisher to its first `n` items.
//!
//! After the `n`-th item the upstream is cancelled and `Complete` is sent
//! downstream right away. Downstream demand is forwarded but capped, so the
//! upstream is never asked for more than `n` items in total.
//!
//! `take(0)` completes on subscription without subscribing upstream.
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::{from_iter, TakeExt};
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::unbounded();
//! from_iter(1..=10).take(3).subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec![1, 2, 3]);
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```

use backflux_core::{
    validate_demand, BackfluxError, BoxSubscriber, EmptySubscription, Publisher, Result,
    SerializedSubscriber, Subscriber, Subscription, SubscriptionRef, SubscriptionSlot,
};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::Arc;

/// Extension trait providing the `take` operator.
pub trait TakeExt<T>: Publisher<T> + Sized {
    /// Emits at most `n` items, then completes and cancels the upstream.
    ///
    /// See the [module-level documentation](crate::take) for details.
    fn take(self, n: u64) -> Take<Self, T>;
}

impl<P, T> TakeExt<T> for P
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn take(self, n: u64) -> Take<Self, T> {
        Take::new(self, n)
    }
}

/// Publisher returned by [`TakeExt::take`].
#[derive(Debug, Clone)]
pub struct Take<P, T> {
    upstream: P,
    limit: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T> Take<P, T> {
    pub(crate) const fn new(upstream: P, limit: u64) -> Self {
        Self {
            upstream,
            limit,
            _marker: PhantomData,
        }
    }
}

impl<P, T> Publisher<T> for Take<P, T>
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        let downstream = SerializedSubscriber::new(subscriber);
        if self.limit == 0 {
            downstream.on_subscribe(EmptySubscription::shared());
            downstream.complete();
            return Ok(());
        }

        let state = Arc::new(TakeState {
            downstream,
            upstream: SubscriptionSlot::new(),
            limit: self.limit,
            forwarded: Mutex::new(0),
        });
        self.upstream.subscribe(Box::new(TakeSubscriber {
            state: state.clone(),
            remaining: self.limit,
        }))
    }
}

struct TakeState<T> {
    downstream: SerializedSubscriber<T>,
    upstream: SubscriptionSlot,
    limit: u64,
    forwarded: Mutex<u64>,
}

impl<T: Send + 'static> Subscription for TakeState<T> {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        let capped = {
            let mut forwarded = self.forwarded.lock();
            let capped = n.min(self.limit - *forwarded);
            *forwarded += capped;
            capped
        };
        if capped == 0 {
            return Ok(());
        }
        self.upstream.request(capped)
    }

    fn cancel(&self) {
        self.upstream.cancel();
        self.downstream.cancel();
    }
}

struct TakeSubscriber<T> {
    state: Arc<TakeState<T>>,
    remaining: u64,
}

impl<T: Send + 'static> Subscriber<T> for TakeSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.upstream.set(subscription);
        self.state
            .downstream
            .on_subscribe(self.state.clone() as SubscriptionRef);
    }

    fn on_next(&mut self, item: T) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        self.state.downstream.next(item);
        if self.remaining == 0 {
            trace!("take limit of {} reached", self.state.limit);
            self.state.upstream.cancel();
            self.state.downstream.complete();
        }
    }

    fn on_error(&mut self, error: BackfluxError) {
        if self.remaining > 0 {
            self.state.downstream.error(error);
        }
    }

    fn on_complete(&mut self) {
        if self.remaining > 0 {
            self.state.downstream.complete();
        }
    }
}
