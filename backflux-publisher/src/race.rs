// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Race operator - mirrors whichever source signals first.
//!
//! Every source is subscribed in order. The first one to deliver any signal,
//! whether an item, an error or completion, becomes the winner: the other
//! sources are cancelled at that moment and everything they emit afterwards
//! is dropped. From then on the winner is relayed unchanged.
//!
//! Demand requested before a winner exists goes to every source; after that,
//! only to the winner. A race over no sources completes immediately.
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::{just, never, race, BoxedExt};
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::unbounded();
//! race(vec![never::<i32>().boxed(), just([1, 2]).boxed()]).subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec![1, 2]);
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```

use backflux_core::{
    validate_demand, BackfluxError, BoxPublisher, BoxSubscriber, Publisher, Result,
    SerializedSubscriber, Signal, Subscriber, Subscription, SubscriptionRef, SubscriptionSlot,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const NO_WINNER: usize = usize::MAX;

/// Publisher returned by [`race`].
pub struct Race<T> {
    sources: Vec<BoxPublisher<T>>,
}

/// Relays the first of `sources` to produce any signal.
pub fn race<T: Send + 'static>(sources: Vec<BoxPublisher<T>>) -> Race<T> {
    Race { sources }
}

/// Extension trait providing the `race_with` operator.
pub trait RaceWithExt<T>: Publisher<T> + Sized + 'static {
    /// Races `self` against `other`. On a tie `self` wins.
    fn race_with<P>(self, other: P) -> Race<T>
    where
        P: Publisher<T> + 'static;
}

impl<S, T> RaceWithExt<T> for S
where
    S: Publisher<T> + 'static,
    T: Send + 'static,
{
    fn race_with<P>(self, other: P) -> Race<T>
    where
        P: Publisher<T> + 'static,
    {
        race(vec![
            Arc::new(self) as BoxPublisher<T>,
            Arc::new(other) as BoxPublisher<T>,
        ])
    }
}

impl<T: Send + 'static> Publisher<T> for Race<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        let coordinator = Arc::new(RaceCoordinator {
            downstream: SerializedSubscriber::new(subscriber),
            winner: AtomicUsize::new(NO_WINNER),
            upstreams: (0..self.sources.len())
                .map(|_| SubscriptionSlot::new())
                .collect(),
        });
        coordinator
            .downstream
            .on_subscribe(coordinator.clone() as SubscriptionRef);

        if self.sources.is_empty() {
            coordinator.downstream.complete();
            return Ok(());
        }

        for (index, source) in self.sources.iter().enumerate() {
            if coordinator.has_winner() || coordinator.downstream.is_cancelled() {
                break;
            }
            let inner = RaceInner {
                coordinator: coordinator.clone(),
                index,
            };
            if let Err(error) = source.subscribe(Box::new(inner)) {
                coordinator.relay(index, Signal::Error(error));
            }
        }
        Ok(())
    }
}

struct RaceCoordinator<T> {
    downstream: SerializedSubscriber<T>,
    winner: AtomicUsize,
    upstreams: Vec<SubscriptionSlot>,
}

impl<T: Send + 'static> RaceCoordinator<T> {
    fn has_winner(&self) -> bool {
        self.winner.load(Ordering::Acquire) != NO_WINNER
    }

    /// Returns `true` if `index` is, or has just become, the winner.
    fn claim(&self, index: usize) -> bool {
        match self
            .winner
            .compare_exchange(NO_WINNER, index, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                debug!("race won by source {}", index);
                for (other, upstream) in self.upstreams.iter().enumerate() {
                    if other != index {
                        upstream.cancel();
                    }
                }
                true
            }
            Err(current) => current == index,
        }
    }

    fn relay(&self, index: usize, signal: Signal<T>) {
        if self.claim(index) {
            self.downstream.emit(signal);
        } else {
            trace!("dropping {} signal from losing source {}", signal.kind(), index);
        }
    }
}

impl<T: Send + 'static> Subscription for RaceCoordinator<T> {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        match self.winner.load(Ordering::Acquire) {
            NO_WINNER => {
                for upstream in &self.upstreams {
                    upstream.request(n)?;
                }
                Ok(())
            }
            winner => self.upstreams[winner].request(n),
        }
    }

    fn cancel(&self) {
        for upstream in &self.upstreams {
            upstream.cancel();
        }
        self.downstream.cancel();
    }
}

struct RaceInner<T> {
    coordinator: Arc<RaceCoordinator<T>>,
    index: usize,
}

impl<T: Send + 'static> Subscriber<T> for RaceInner<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.coordinator.upstreams[self.index].set(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.coordinator.relay(self.index, Signal::Next(item));
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.coordinator.relay(self.index, Signal::Error(error));
    }

    fn on_complete(&mut self) {
        self.coordinator.relay(self.index, Signal::Complete);
    }
}
