// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    validate_demand, BackfluxError, BoxPublisher, BoxSubscriber, Demand, Publisher, Result,
    Subscriber, Subscription, SubscriptionRef,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct ProbeState {
    subscriptions: AtomicUsize,
    requested: Demand,
    requests: AtomicUsize,
    cancelled: AtomicBool,
}

/// Wraps a publisher and records how it was used.
///
/// Clones share the same record, so one clone can be handed to an operator
/// while the test keeps the other for assertions.
///
/// ```rust
/// use backflux_core::Publisher;
/// use backflux_publisher::{just, ThenEmptyExt};
/// use backflux_test_utils::{PublisherProbe, TestSubscriber};
///
/// # fn main() -> backflux_core::Result<()> {
/// let probe = PublisherProbe::of(just([1, 2, 3]));
/// let subscriber = TestSubscriber::without_demand();
/// probe.clone().then_empty().subscribe(subscriber.boxed())?;
///
/// assert!(subscriber.is_completed());
/// assert!(probe.was_subscribed());
/// assert!(probe.was_requested());
/// assert!(!probe.was_cancelled());
/// # Ok(())
/// # }
/// ```
pub struct PublisherProbe<T> {
    upstream: BoxPublisher<T>,
    state: Arc<ProbeState>,
}

impl<T> Clone for PublisherProbe<T> {
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T: Send + 'static> PublisherProbe<T> {
    pub fn of(publisher: impl Publisher<T> + 'static) -> Self {
        Self {
            upstream: Arc::new(publisher),
            state: Arc::default(),
        }
    }

    #[must_use]
    pub fn was_subscribed(&self) -> bool {
        self.subscription_count() > 0
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.state.subscriptions.load(Ordering::Acquire)
    }

    /// `true` once any valid `request` reached the probed publisher.
    #[must_use]
    pub fn was_requested(&self) -> bool {
        self.state.requests.load(Ordering::Acquire) > 0
    }

    /// Sum of all requests, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.state.requested.current()
    }

    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }
}

impl<T: Send + 'static> Publisher<T> for PublisherProbe<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) -> Result<()> {
        self.state.subscriptions.fetch_add(1, Ordering::AcqRel);
        self.upstream.subscribe(Box::new(ProbeSubscriber {
            downstream: subscriber,
            state: self.state.clone(),
        }))
    }
}

struct ProbeSubscriber<T> {
    downstream: BoxSubscriber<T>,
    state: Arc<ProbeState>,
}

impl<T: Send + 'static> Subscriber<T> for ProbeSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.downstream.on_subscribe(Arc::new(ProbeSubscription {
            upstream: subscription,
            state: self.state.clone(),
        }));
    }

    fn on_next(&mut self, item: T) {
        self.downstream.on_next(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}

struct ProbeSubscription {
    upstream: SubscriptionRef,
    state: Arc<ProbeState>,
}

impl Subscription for ProbeSubscription {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        self.state.requests.fetch_add(1, Ordering::AcqRel);
        self.state.requested.add(n);
        self.upstream.request(n)
    }

    fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        self.upstream.cancel();
    }
}
