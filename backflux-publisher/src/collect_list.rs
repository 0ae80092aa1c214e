// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Collect-list operator - gathers every item into a single `Vec`.
//!
//! The upstream is requested without bound as soon as it subscribes. On
//! completion the accumulated list is emitted once, followed by `Complete`;
//! an empty upstream yields an empty list. If the upstream fails, the error
//! is forwarded and the partial list is discarded.
//!
//! The list is held back until the downstream requests at least one item.
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::{just, CollectListExt};
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::unbounded();
//! just(["a", "b", "c"]).collect_list().subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec![vec!["a", "b", "c"]]);
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```

use crate::scalar::DeferredScalar;
use backflux_core::{
    request_upstream, validate_demand, BackfluxError, BoxSubscriber, Publisher, Result,
    SerializedSubscriber, Subscriber, Subscription, SubscriptionRef, SubscriptionSlot, UNBOUNDED,
};
use std::marker::PhantomData;
use std::sync::Arc;

/// Extension trait providing the `collect_list` operator.
pub trait CollectListExt<T>: Publisher<T> + Sized {
    /// Emits all items as one `Vec` when the upstream completes.
    fn collect_list(self) -> CollectList<Self, T>;
}

impl<P, T> CollectListExt<T> for P
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn collect_list(self) -> CollectList<Self, T> {
        CollectList {
            upstream: self,
            _marker: PhantomData,
        }
    }
}

/// Publisher returned by [`CollectListExt::collect_list`].
pub struct CollectList<P, T> {
    upstream: P,
    _marker: PhantomData<fn() -> T>,
}

impl<P, T> Publisher<Vec<T>> for CollectList<P, T>
where
    P: Publisher<T>,
    T: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<Vec<T>>) -> Result<()> {
        let downstream = SerializedSubscriber::new(subscriber);
        let state = Arc::new(CollectState {
            result: DeferredScalar::new(downstream.clone()),
            downstream,
            upstream: SubscriptionSlot::new(),
        });
        self.upstream.subscribe(Box::new(CollectSubscriber {
            state,
            items: Vec::new(),
        }))
    }
}

struct CollectState<T> {
    downstream: SerializedSubscriber<Vec<T>>,
    result: DeferredScalar<Vec<T>>,
    upstream: SubscriptionSlot,
}

impl<T: Send + 'static> Subscription for CollectState<T> {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        self.result.request();
        Ok(())
    }

    fn cancel(&self) {
        self.upstream.cancel();
        self.result.cancel();
        self.downstream.cancel();
    }
}

struct CollectSubscriber<T> {
    state: Arc<CollectState<T>>,
    items: Vec<T>,
}

impl<T: Send + 'static> Subscriber<T> for CollectSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.upstream.set(subscription);
        self.state
            .downstream
            .on_subscribe(self.state.clone() as SubscriptionRef);
        request_upstream(&self.state.upstream, UNBOUNDED);
    }

    fn on_next(&mut self, item: T) {
        self.items.push(item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.items.clear();
        self.state.downstream.error(error);
    }

    fn on_complete(&mut self) {
        trace!("collect_list gathered {} items", self.items.len());
        self.state.result.resolve(std::mem::take(&mut self.items));
    }
}
