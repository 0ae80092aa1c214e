// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Item transformation operators.
//!
//! - [`map`](MapExt::map) applies an infallible function to every item
//! - [`try_map`](MapExt::try_map) applies a fallible one; the first `Err`
//!   cancels the upstream and becomes the terminal `Error`
//!
//! Demand passes through one-to-one.
//!
//! # Examples
//!
//! ```
//! use backflux_core::{BackfluxError, Publisher};
//! use backflux_publisher::{just, MapExt};
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::unbounded();
//! just([1, 2, 0, 4])
//!     .try_map(|n| {
//!         if n == 0 {
//!             Err(BackfluxError::upstream_message("zero"))
//!         } else {
//!             Ok(10 / n)
//!         }
//!     })
//!     .subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec![10, 5]);
//! assert!(subscriber.error().is_some());
//! # Ok(())
//! # }
//! ```

use crate::relay::Relay;
use backflux_core::{
    BackfluxError, BoxSubscriber, Publisher, Result, Subscriber, SubscriptionRef,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Extension trait providing the `map` and `try_map` operators.
pub trait MapExt<T>: Publisher<T> + Sized {
    /// Transforms every item with `f`.
    fn map<U, F>(self, f: F) -> Map<Self, T, F>
    where
        F: Fn(T) -> U + Send + Sync + 'static;

    /// Transforms every item with `f`, failing the sequence on the first `Err`.
    fn try_map<U, F>(self, f: F) -> TryMap<Self, T, F>
    where
        F: Fn(T) -> Result<U> + Send + Sync + 'static;
}

impl<P, T> MapExt<T> for P
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn map<U, F>(self, f: F) -> Map<Self, T, F>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Map {
            upstream: self,
            f: Arc::new(f),
            _marker: PhantomData,
        }
    }

    fn try_map<U, F>(self, f: F) -> TryMap<Self, T, F>
    where
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        TryMap {
            upstream: self,
            f: Arc::new(f),
            _marker: PhantomData,
        }
    }
}

/// Publisher returned by [`MapExt::map`].
pub struct Map<P, T, F> {
    upstream: P,
    f: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

/// Publisher returned by [`MapExt::try_map`].
pub struct TryMap<P, T, F> {
    upstream: P,
    f: Arc<F>,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T, U, F> Publisher<U> for Map<P, T, F>
where
    P: Publisher<T>,
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<U>) -> Result<()> {
        let f = self.f.clone();
        self.upstream.subscribe(Box::new(MapSubscriber::new(
            subscriber,
            move |item: T| -> Result<U> { Ok(f(item)) },
        )))
    }
}

impl<P, T, U, F> Publisher<U> for TryMap<P, T, F>
where
    P: Publisher<T>,
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Result<U> + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<U>) -> Result<()> {
        let f = self.f.clone();
        self.upstream.subscribe(Box::new(MapSubscriber::new(
            subscriber,
            move |item: T| -> Result<U> { f(item) },
        )))
    }
}

struct MapSubscriber<T, U, F> {
    relay: Arc<Relay<U>>,
    f: F,
    done: bool,
    _marker: PhantomData<fn(T)>,
}

impl<T, U, F> MapSubscriber<T, U, F>
where
    U: Send + 'static,
    F: FnMut(T) -> Result<U> + Send,
{
    fn new(subscriber: BoxSubscriber<U>, f: F) -> Self {
        Self {
            relay: Relay::new(subscriber),
            f,
            done: false,
            _marker: PhantomData,
        }
    }
}

impl<T, U, F> Subscriber<T> for MapSubscriber<T, U, F>
where
    U: Send + 'static,
    F: FnMut(T) -> Result<U> + Send,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.relay.connect(subscription);
    }

    fn on_next(&mut self, item: T) {
        if self.done {
            return;
        }
        match (self.f)(item) {
            Ok(mapped) => self.relay.downstream.next(mapped),
            Err(error) => {
                self.done = true;
                self.relay.fail(error);
            }
        }
    }

    fn on_error(&mut self, error: BackfluxError) {
        if !self.done {
            self.done = true;
            self.relay.downstream.error(error);
        }
    }

    fn on_complete(&mut self) {
        if !self.done {
            self.done = true;
            self.relay.downstream.complete();
        }
    }
}
