// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    BackfluxError, BoxSubscriber, EmptySubscription, Publisher, Result, SerializedSubscriber,
};
use std::marker::PhantomData;

/// Publisher that fails every subscriber. See [`error`].
#[derive(Debug, Clone)]
pub struct ErrorPublisher<T> {
    error: BackfluxError,
    _marker: PhantomData<fn() -> T>,
}

/// Signals `error` right after `on_subscribe`, without waiting for demand.
///
/// ```
/// use backflux_core::{BackfluxError, Publisher};
/// use backflux_publisher::error;
/// use backflux_test_utils::TestSubscriber;
///
/// # fn main() -> backflux_core::Result<()> {
/// let subscriber = TestSubscriber::<i32>::without_demand();
/// error(BackfluxError::illegal_state("boom")).subscribe(subscriber.boxed())?;
///
/// assert_eq!(subscriber.error(), Some(BackfluxError::illegal_state("boom")));
/// assert!(subscriber.items().is_empty());
/// # Ok(())
/// # }
/// ```
pub fn error<T>(error: BackfluxError) -> ErrorPublisher<T> {
    ErrorPublisher {
        error,
        _marker: PhantomData,
    }
}

impl<T: Send + 'static> Publisher<T> for ErrorPublisher<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        let downstream = SerializedSubscriber::new(subscriber);
        downstream.on_subscribe(EmptySubscription::shared());
        downstream.error(self.error.clone());
        Ok(())
    }
}
