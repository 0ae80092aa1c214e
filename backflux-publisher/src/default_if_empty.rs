// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Default-if-empty operator - substitutes a fallback for an empty sequence.
//!
//! Items and errors pass through untouched. If the upstream completes
//! without emitting anything, the fallback is emitted once demand allows and
//! is followed by `Complete`.
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::{empty, DefaultIfEmptyExt};
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::unbounded();
//! empty().default_if_empty("fallback").subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec!["fallback"]);
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```

use crate::scalar::DeferredScalar;
use backflux_core::{
    validate_demand, BackfluxError, BoxSubscriber, Publisher, Result, SerializedSubscriber,
    Subscriber, Subscription, SubscriptionRef, SubscriptionSlot,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Extension trait providing the `default_if_empty` operator.
pub trait DefaultIfEmptyExt<T>: Publisher<T> + Sized {
    /// Emits `fallback` if the upstream completes without items.
    fn default_if_empty(self, fallback: T) -> DefaultIfEmpty<Self, T>;
}

impl<P, T> DefaultIfEmptyExt<T> for P
where
    P: Publisher<T>,
    T: Clone + Send + Sync + 'static,
{
    fn default_if_empty(self, fallback: T) -> DefaultIfEmpty<Self, T> {
        DefaultIfEmpty {
            upstream: self,
            fallback,
            _marker: PhantomData,
        }
    }
}

/// Publisher returned by [`DefaultIfEmptyExt::default_if_empty`].
pub struct DefaultIfEmpty<P, T> {
    upstream: P,
    fallback: T,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T> Publisher<T> for DefaultIfEmpty<P, T>
where
    P: Publisher<T>,
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        let downstream = SerializedSubscriber::new(subscriber);
        let state = Arc::new(FallbackState {
            fallback: DeferredScalar::new(downstream.clone()),
            downstream,
            upstream: SubscriptionSlot::new(),
        });
        self.upstream.subscribe(Box::new(DefaultIfEmptySubscriber {
            state,
            fallback: Some(self.fallback.clone()),
        }))
    }
}

struct FallbackState<T> {
    downstream: SerializedSubscriber<T>,
    fallback: DeferredScalar<T>,
    upstream: SubscriptionSlot,
}

impl<T: Send + 'static> Subscription for FallbackState<T> {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        self.fallback.request();
        self.upstream.request(n)
    }

    fn cancel(&self) {
        self.upstream.cancel();
        self.fallback.cancel();
        self.downstream.cancel();
    }
}

struct DefaultIfEmptySubscriber<T> {
    state: Arc<FallbackState<T>>,
    // Taken by the first item: once anything was emitted the fallback is moot.
    fallback: Option<T>,
}

impl<T: Send + 'static> Subscriber<T> for DefaultIfEmptySubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.upstream.set(subscription);
        self.state
            .downstream
            .on_subscribe(self.state.clone() as SubscriptionRef);
    }

    fn on_next(&mut self, item: T) {
        self.fallback = None;
        self.state.downstream.next(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.state.downstream.error(error);
    }

    fn on_complete(&mut self) {
        match self.fallback.take() {
            Some(fallback) => {
                trace!("upstream completed empty: emitting fallback");
                self.state.fallback.resolve(fallback);
            }
            None => self.state.downstream.complete(),
        }
    }
}
