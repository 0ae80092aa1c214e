// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::BackfluxError;
use crate::signal::Signal;
use crate::subscription::SubscriptionRef;

/// Consumer of a publisher's signals.
///
/// `on_subscribe` is always called first and exactly once. It is followed by
/// any number of `on_next` calls bounded by the requested demand, and at most
/// one of `on_error` / `on_complete`. Calls are never concurrent.
pub trait Subscriber<T>: Send {
    fn on_subscribe(&mut self, subscription: SubscriptionRef);

    fn on_next(&mut self, item: T);

    fn on_error(&mut self, error: BackfluxError);

    fn on_complete(&mut self);

    /// Dispatches a [`Signal`] to the matching callback.
    fn on_signal(&mut self, signal: Signal<T>) {
        match signal {
            Signal::Next(item) => self.on_next(item),
            Signal::Error(error) => self.on_error(error),
            Signal::Complete => self.on_complete(),
        }
    }
}

/// Owned, type-erased subscriber.
pub type BoxSubscriber<T> = Box<dyn Subscriber<T>>;

impl<T, S> Subscriber<T> for Box<S>
where
    S: Subscriber<T> + ?Sized,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        (**self).on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        (**self).on_next(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        (**self).on_error(error);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}
