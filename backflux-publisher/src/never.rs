// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{BoxSubscriber, EmptySubscription, Publisher, Result, SerializedSubscriber};
use std::marker::PhantomData;

/// Publisher that never signals anything after `on_subscribe`. See [`never`].
#[derive(Debug, Clone, Copy)]
pub struct Never<T> {
    _marker: PhantomData<fn() -> T>,
}

/// Subscribes, accepts any demand and stays silent forever.
///
/// Useful as the losing side of a [`race`](crate::race) or to keep a
/// [`zip`](crate::zip) from completing.
#[must_use]
pub const fn never<T>() -> Never<T> {
    Never {
        _marker: PhantomData,
    }
}

impl<T: Send + 'static> Publisher<T> for Never<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        SerializedSubscriber::new(subscriber).on_subscribe(EmptySubscription::shared());
        Ok(())
    }
}
