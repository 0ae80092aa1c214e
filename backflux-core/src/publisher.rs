// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::Result;
use crate::subscriber::BoxSubscriber;
use std::sync::Arc;

/// A source of an ordered signal sequence, gated by demand.
///
/// Publishers are cold unless documented otherwise: every call to
/// [`subscribe`](Publisher::subscribe) starts a fresh sequence with its own
/// operator state.
pub trait Publisher<T>: Send + Sync {
    /// Registers one subscriber.
    ///
    /// On success the subscriber receives `on_subscribe` before any other
    /// signal. Failures detected after `on_subscribe` are delivered as an
    /// `Error` signal rather than returned.
    ///
    /// # Errors
    /// Returns [`BackfluxError::IllegalState`](crate::BackfluxError::IllegalState)
    /// when a single-use publisher is subscribed a second time; the subscriber
    /// is dropped without receiving any signal.
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()>;
}

/// Shared, type-erased publisher.
pub type BoxPublisher<T> = Arc<dyn Publisher<T>>;

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        (**self).subscribe(subscriber)
    }
}

impl<T, P> Publisher<T> for Box<P>
where
    P: Publisher<T> + ?Sized,
{
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        (**self).subscribe(subscriber)
    }
}
