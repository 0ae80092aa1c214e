// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Completion-only adapter.
//!
//! [`then_empty`](ThenEmptyExt::then_empty) drains the upstream with
//! unbounded demand, discards every item and relays only the terminal
//! signal. Downstream demand is validated but otherwise irrelevant: there
//! are no items to deliver.
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::{just, ThenEmptyExt};
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::without_demand();
//! just([1, 2, 3]).then_empty().subscribe(subscriber.boxed())?;
//!
//! assert!(subscriber.items().is_empty());
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```

use backflux_core::{
    request_upstream, validate_demand, BackfluxError, BoxSubscriber, Publisher, Result,
    SerializedSubscriber, Subscriber, Subscription, SubscriptionRef, SubscriptionSlot, UNBOUNDED,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Extension trait providing the `then_empty` operator.
pub trait ThenEmptyExt<T>: Publisher<T> + Sized {
    /// Ignores all items and signals only completion or error.
    fn then_empty(self) -> ThenEmpty<Self, T>;
}

impl<P, T> ThenEmptyExt<T> for P
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn then_empty(self) -> ThenEmpty<Self, T> {
        ThenEmpty {
            upstream: self,
            _marker: PhantomData,
        }
    }
}

/// Publisher returned by [`ThenEmptyExt::then_empty`].
pub struct ThenEmpty<P, T> {
    upstream: P,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T> Publisher<()> for ThenEmpty<P, T>
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<()>) -> Result<()> {
        let state = Arc::new(TerminalState {
            downstream: SerializedSubscriber::new(subscriber),
            upstream: SubscriptionSlot::new(),
        });
        self.upstream.subscribe(Box::new(ThenEmptySubscriber {
            state,
            _marker: PhantomData,
        }))
    }
}

struct TerminalState {
    downstream: SerializedSubscriber<()>,
    upstream: SubscriptionSlot,
}

impl Subscription for TerminalState {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n).map(|_| ())
    }

    fn cancel(&self) {
        self.upstream.cancel();
        self.downstream.cancel();
    }
}

struct ThenEmptySubscriber<T> {
    state: Arc<TerminalState>,
    _marker: PhantomData<fn(T)>,
}

impl<T: Send + 'static> Subscriber<T> for ThenEmptySubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.upstream.set(subscription);
        self.state
            .downstream
            .on_subscribe(self.state.clone() as SubscriptionRef);
        request_upstream(&self.state.upstream, UNBOUNDED);
    }

    fn on_next(&mut self, _item: T) {}

    fn on_error(&mut self, error: BackfluxError) {
        self.state.downstream.error(error);
    }

    fn on_complete(&mut self) {
        self.state.downstream.complete();
    }
}
