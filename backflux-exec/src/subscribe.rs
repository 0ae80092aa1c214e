// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Attaching subscribers to publishers.
//!
//! - [`subscribe`] attaches any [`Subscriber`] and returns a [`Disposable`]
//! - [`SubscribeExt::subscribe_with`] attaches three callbacks and requests
//!   everything up front
//!
//! # Examples
//!
//! ```
//! use backflux_exec::SubscribeExt;
//! use backflux_publisher::just;
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! let disposable = just([1, 2, 3]).subscribe_with(
//!     move |item| sink.lock().push(item),
//!     |error| panic!("unexpected error: {error}"),
//!     || {},
//! )?;
//!
//! assert!(disposable.is_terminated());
//! assert_eq!(*seen.lock(), vec![1, 2, 3]);
//! # Ok(())
//! # }
//! ```

use crate::disposable::Disposable;
use backflux_core::{
    request_upstream, BackfluxError, Publisher, Result, Subscriber, SubscriptionRef, UNBOUNDED,
};

/// Subscribes `subscriber` to `publisher`.
///
/// The returned [`Disposable`] cancels the subscription and reports when the
/// sequence has terminated.
///
/// # Errors
/// Whatever `publisher.subscribe` returns, e.g. `IllegalState` for a second
/// subscription to a single-use source.
pub fn subscribe<T, P, S>(publisher: &P, subscriber: S) -> Result<Disposable>
where
    T: Send + 'static,
    P: Publisher<T> + ?Sized,
    S: Subscriber<T> + 'static,
{
    let disposable = Disposable::new();
    publisher.subscribe(Box::new(Tracked {
        inner: subscriber,
        disposable: disposable.clone(),
    }))?;
    Ok(disposable)
}

/// Extension trait for callback-based subscription.
pub trait SubscribeExt<T>: Publisher<T> {
    /// Requests every item and hands the signals to the given callbacks.
    ///
    /// # Errors
    /// See [`subscribe`].
    fn subscribe_with<N, E, C>(
        &self,
        on_next: N,
        on_error: E,
        on_complete: C,
    ) -> Result<Disposable>
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(BackfluxError) + Send + 'static,
        C: FnOnce() + Send + 'static;
}

impl<P, T> SubscribeExt<T> for P
where
    P: Publisher<T> + ?Sized,
    T: Send + 'static,
{
    fn subscribe_with<N, E, C>(
        &self,
        on_next: N,
        on_error: E,
        on_complete: C,
    ) -> Result<Disposable>
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(BackfluxError) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        subscribe(
            self,
            Callbacks {
                on_next,
                on_error: Some(on_error),
                on_complete: Some(on_complete),
            },
        )
    }
}

struct Tracked<S> {
    inner: S,
    disposable: Disposable,
}

impl<T, S> Subscriber<T> for Tracked<S>
where
    T: Send + 'static,
    S: Subscriber<T>,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.disposable.attach(subscription.clone());
        self.inner.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.inner.on_next(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.inner.on_error(error);
        self.disposable.mark_terminated();
    }

    fn on_complete(&mut self) {
        self.inner.on_complete();
        self.disposable.mark_terminated();
    }
}

struct Callbacks<N, E, C> {
    on_next: N,
    on_error: Option<E>,
    on_complete: Option<C>,
}

impl<T, N, E, C> Subscriber<T> for Callbacks<N, E, C>
where
    N: FnMut(T) + Send,
    E: FnOnce(BackfluxError) + Send,
    C: FnOnce() + Send,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        request_upstream(subscription.as_ref(), UNBOUNDED);
    }

    fn on_next(&mut self, item: T) {
        (self.on_next)(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        match self.on_error.take() {
            Some(on_error) => on_error(error),
            None => warn!("error after terminal signal dropped: {}", error),
        }
    }

    fn on_complete(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}
