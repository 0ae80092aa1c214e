// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cold sources that replay an in-memory sequence.
//!
//! - [`just`] - a fixed list of values, in argument order
//! - [`from_iter`] - any cloneable iterable; every subscriber gets a fresh pass
//! - [`from_iterator`] - a one-shot iterator; a second subscription is rejected
//! - [`from_option`] - zero or one value
//! - [`empty`] - no values at all
//!
//! All of them emit exactly as many items as the subscriber requested and
//! complete right after the last item, without waiting for further demand.
//! An exhausted sequence completes on the first `request`.
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::just;
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::with_demand(2);
//! just(["foo", "bar", "baz"]).subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec!["foo", "bar"]);
//! assert!(!subscriber.is_terminated());
//!
//! subscriber.request(1)?;
//! assert_eq!(subscriber.items(), vec!["foo", "bar", "baz"]);
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```

use backflux_core::{
    validate_demand, BackfluxError, BoxSubscriber, Demand, Publisher, Result,
    SerializedSubscriber, Subscription, SubscriptionRef, WorkInProgress,
};
use parking_lot::Mutex;
use std::iter::Peekable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Publisher over a cloneable iterable. See [`from_iter`].
#[derive(Debug, Clone)]
pub struct FromIter<I> {
    iterable: I,
}

/// Publisher over a one-shot iterator. See [`from_iterator`].
pub struct FromIterator<It> {
    iterator: Mutex<Option<It>>,
}

/// Emits `values` in order, then completes.
pub fn just<T, const N: usize>(values: [T; N]) -> FromIter<[T; N]>
where
    T: Clone + Send + Sync + 'static,
{
    FromIter { iterable: values }
}

/// Emits the items of `iterable`. Each subscriber iterates its own clone.
pub fn from_iter<I>(iterable: I) -> FromIter<I>
where
    I: IntoIterator + Clone + Send + Sync,
{
    FromIter { iterable }
}

/// Emits the items of `iterator` to the first subscriber only.
///
/// Any later subscription fails with
/// [`BackfluxError::IllegalState`] and the subscriber receives no signal.
pub fn from_iterator<It>(iterator: It) -> FromIterator<It>
where
    It: Iterator + Send,
{
    FromIterator {
        iterator: Mutex::new(Some(iterator)),
    }
}

/// Emits the value if present, then completes. `None` completes immediately.
pub fn from_option<T>(value: Option<T>) -> FromIter<Option<T>>
where
    T: Clone + Send + Sync + 'static,
{
    FromIter { iterable: value }
}

/// Completes on the first request without emitting anything.
pub fn empty<T>() -> FromIter<std::iter::Empty<T>>
where
    T: Send + 'static,
{
    FromIter {
        iterable: std::iter::empty(),
    }
}

impl<I> Publisher<I::Item> for FromIter<I>
where
    I: IntoIterator + Clone + Send + Sync,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<I::Item>) -> Result<()> {
        IterSubscription::start(self.iterable.clone().into_iter(), subscriber);
        Ok(())
    }
}

impl<It> Publisher<It::Item> for FromIterator<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<It::Item>) -> Result<()> {
        let Some(iterator) = self.iterator.lock().take() else {
            warn!("from_iterator subscribed twice");
            return Err(BackfluxError::illegal_state(
                "from_iterator allows only a single subscriber",
            ));
        };
        IterSubscription::start(iterator, subscriber);
        Ok(())
    }
}

enum Step<T> {
    Emit(T),
    Complete,
    Idle,
}

struct IterSubscription<It: Iterator> {
    iterator: Mutex<Option<Peekable<It>>>,
    demand: Demand,
    wip: WorkInProgress,
    cancelled: AtomicBool,
    downstream: SerializedSubscriber<It::Item>,
}

impl<It> IterSubscription<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    fn start(iterator: It, subscriber: BoxSubscriber<It::Item>) {
        let downstream = SerializedSubscriber::new(subscriber);
        let subscription = Arc::new(Self {
            iterator: Mutex::new(Some(iterator.peekable())),
            demand: Demand::new(),
            wip: WorkInProgress::new(),
            cancelled: AtomicBool::new(false),
            downstream: downstream.clone(),
        });
        downstream.on_subscribe(subscription as SubscriptionRef);
    }

    fn drain(&self) {
        self.wip.drain(|| loop {
            if self.cancelled.load(Ordering::Acquire) {
                self.iterator.lock().take();
                return;
            }

            let step = {
                let mut guard = self.iterator.lock();
                let Some(iterator) = guard.as_mut() else {
                    return;
                };
                if iterator.peek().is_none() {
                    guard.take();
                    Step::Complete
                } else if self.demand.try_take() {
                    iterator.next().map_or(Step::Complete, Step::Emit)
                } else {
                    Step::Idle
                }
            };

            match step {
                Step::Emit(item) => self.downstream.next(item),
                Step::Complete => {
                    trace!("iterable source exhausted");
                    self.downstream.complete();
                    return;
                }
                Step::Idle => return,
            }
        });
    }
}

impl<It> Subscription for IterSubscription<It>
where
    It: Iterator + Send + 'static,
    It::Item: Send + 'static,
{
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        self.demand.add(n);
        self.drain();
        Ok(())
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.downstream.cancel();
        self.drain();
    }
}
