// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Publisher wrapper that fails at a chosen position.
//!
//! Useful for checking how operators propagate an upstream error and whether
//! they cancel their other inputs.
//!
//! ```rust
//! use backflux_core::{BackfluxError, Publisher};
//! use backflux_publisher::just;
//! use backflux_test_utils::{ErrorInjectingPublisher, TestSubscriber};
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::unbounded();
//! ErrorInjectingPublisher::new(just([1, 2, 3]), 1).subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec![1]);
//! assert!(matches!(subscriber.error(), Some(BackfluxError::Upstream(_))));
//! # Ok(())
//! # }
//! ```

use backflux_core::{
    BackfluxError, BoxPublisher, BoxSubscriber, Publisher, Result, Subscriber, SubscriptionRef,
};
use std::sync::Arc;

/// Error raised by [`ErrorInjectingPublisher`] and by test closures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestError {
    #[error("injected test error at position {position}")]
    Injected { position: usize },

    #[error("test failure: {0}")]
    Failure(String),
}

/// Replaces the item at `position` (0-indexed) with an `Upstream` error and
/// cancels the wrapped publisher.
pub struct ErrorInjectingPublisher<T> {
    upstream: BoxPublisher<T>,
    position: usize,
}

impl<T: Send + 'static> ErrorInjectingPublisher<T> {
    pub fn new(publisher: impl Publisher<T> + 'static, position: usize) -> Self {
        Self {
            upstream: Arc::new(publisher),
            position,
        }
    }
}

impl<T: Send + 'static> Publisher<T> for ErrorInjectingPublisher<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        self.upstream.subscribe(Box::new(InjectingSubscriber {
            downstream: subscriber,
            upstream: None,
            position: self.position,
            count: 0,
            done: false,
        }))
    }
}

struct InjectingSubscriber<T> {
    downstream: BoxSubscriber<T>,
    upstream: Option<SubscriptionRef>,
    position: usize,
    count: usize,
    done: bool,
}

impl<T: Send + 'static> Subscriber<T> for InjectingSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.upstream = Some(subscription.clone());
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        if self.done {
            return;
        }
        if self.count == self.position {
            self.done = true;
            if let Some(upstream) = self.upstream.take() {
                upstream.cancel();
            }
            self.downstream.on_error(BackfluxError::upstream(TestError::Injected {
                position: self.position,
            }));
            return;
        }
        self.count += 1;
        self.downstream.on_next(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        if !std::mem::replace(&mut self.done, true) {
            self.downstream.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if !std::mem::replace(&mut self.done, true) {
            self.downstream.on_complete();
        }
    }
}
