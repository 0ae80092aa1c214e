// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Recording subscriber with manual demand control.
//!
//! A [`TestSubscriber`] is a cloneable handle: pass [`boxed()`](TestSubscriber::boxed)
//! to `subscribe` and keep the original to inspect what arrived, request more
//! or cancel.
//!
//! ```rust
//! use backflux_core::Publisher;
//! use backflux_publisher::from_iter;
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::without_demand();
//! from_iter(vec![1, 2, 3]).subscribe(subscriber.boxed())?;
//! assert!(subscriber.items().is_empty());
//!
//! subscriber.request(2)?;
//! assert_eq!(subscriber.items(), vec![1, 2]);
//!
//! subscriber.cancel();
//! assert!(!subscriber.is_terminated());
//! # Ok(())
//! # }
//! ```

use backflux_core::{
    request_upstream, BackfluxError, BoxSubscriber, Latch, Result, Subscriber, SubscriptionRef,
    UNBOUNDED,
};
use event_listener::{Event, Listener};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Record<T> {
    items: Vec<T>,
    error: Option<BackfluxError>,
    completed: bool,
    subscriptions: usize,
    violations: usize,
}

impl<T> Record<T> {
    const fn terminated(&self) -> bool {
        self.completed || self.error.is_some()
    }
}

struct Inner<T> {
    record: Mutex<Record<T>>,
    subscription: Mutex<Option<SubscriptionRef>>,
    initial_demand: u64,
    changed: Event,
    terminal: Latch,
}

/// Subscriber that records every signal it receives.
pub struct TestSubscriber<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for TestSubscriber<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> TestSubscriber<T> {
    /// Requests `initial_demand` items as soon as it is subscribed.
    /// Zero means no initial request.
    #[must_use]
    pub fn with_demand(initial_demand: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                record: Mutex::new(Record {
                    items: Vec::new(),
                    error: None,
                    completed: false,
                    subscriptions: 0,
                    violations: 0,
                }),
                subscription: Mutex::new(None),
                initial_demand,
                changed: Event::new(),
                terminal: Latch::new(),
            }),
        }
    }

    /// Requests everything up front.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::with_demand(UNBOUNDED)
    }

    /// Requests nothing until [`request`](Self::request) is called.
    #[must_use]
    pub fn without_demand() -> Self {
        Self::with_demand(0)
    }

    /// A boxed handle sharing this subscriber's record.
    #[must_use]
    pub fn boxed(&self) -> BoxSubscriber<T> {
        Box::new(self.clone())
    }

    /// Requests `n` more items from the current subscription.
    ///
    /// # Errors
    /// `IllegalState` before `on_subscribe`, or whatever the subscription
    /// returns (`InvalidDemand` for zero).
    pub fn request(&self, n: u64) -> Result<()> {
        let subscription = self.inner.subscription.lock().clone();
        match subscription {
            Some(subscription) => subscription.request(n),
            None => Err(BackfluxError::illegal_state(
                "request before on_subscribe",
            )),
        }
    }

    /// Cancels the current subscription, if any.
    pub fn cancel(&self) {
        let subscription = self.inner.subscription.lock().clone();
        if let Some(subscription) = subscription {
            subscription.cancel();
        }
    }

    /// The subscription handed over by `on_subscribe`.
    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionRef> {
        self.inner.subscription.lock().clone()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.inner.record.lock().items.len()
    }

    #[must_use]
    pub fn error(&self) -> Option<BackfluxError> {
        self.inner.record.lock().error.clone()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.inner.record.lock().completed
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.inner.record.lock().terminated()
    }

    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.inner.record.lock().subscriptions > 0
    }

    /// Number of `on_subscribe` calls received.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.record.lock().subscriptions
    }

    /// Signals that arrived after a terminal signal.
    #[must_use]
    pub fn violations(&self) -> usize {
        self.inner.record.lock().violations
    }

    /// Blocks until a terminal signal arrives or `timeout` elapses.
    #[must_use]
    pub fn wait_terminal(&self, timeout: Duration) -> bool {
        self.inner.terminal.wait_timeout(timeout)
    }

    /// Waits asynchronously for a terminal signal, up to `timeout`.
    pub async fn await_terminal(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.inner.terminal.wait())
            .await
            .is_ok()
    }

    /// Blocks until at least `count` items were received, a terminal signal
    /// arrived, or `timeout` elapsed. Returns `true` if `count` was reached.
    /// A timeout too large to form a deadline waits without one.
    #[must_use]
    pub fn wait_items(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            {
                let record = self.inner.record.lock();
                if record.items.len() >= count {
                    return true;
                }
                if record.terminated() {
                    return false;
                }
            }
            let listener = self.inner.changed.listen();
            {
                let record = self.inner.record.lock();
                if record.items.len() >= count || record.terminated() {
                    continue;
                }
            }
            match deadline {
                Some(deadline) => {
                    if listener.wait_deadline(deadline).is_none() {
                        return self.item_count() >= count;
                    }
                }
                None => listener.wait(),
            }
        }
    }

    fn update(&self, f: impl FnOnce(&mut Record<T>)) {
        f(&mut self.inner.record.lock());
        self.inner.changed.notify(usize::MAX);
    }

    fn terminate(&self, f: impl FnOnce(&mut Record<T>)) {
        self.update(|record| {
            if record.terminated() {
                record.violations += 1;
                return;
            }
            f(record);
        });
        self.inner.terminal.open();
    }
}

impl<T: Clone + Send + 'static> TestSubscriber<T> {
    /// Items received so far.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.inner.record.lock().items.clone()
    }
}

impl<T: Send + 'static> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        {
            let mut current = self.inner.subscription.lock();
            if current.is_some() {
                drop(current);
                self.update(|record| {
                    record.subscriptions += 1;
                    record.violations += 1;
                });
                subscription.cancel();
                return;
            }
            *current = Some(subscription.clone());
        }
        self.update(|record| record.subscriptions += 1);
        if self.inner.initial_demand > 0 {
            request_upstream(subscription.as_ref(), self.inner.initial_demand);
        }
    }

    fn on_next(&mut self, item: T) {
        self.update(|record| {
            if record.terminated() {
                record.violations += 1;
            } else {
                record.items.push(item);
            }
        });
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.terminate(|record| record.error = Some(error));
    }

    fn on_complete(&mut self) {
        self.terminate(|record| record.completed = true);
    }
}
