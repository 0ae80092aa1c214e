// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Blocking helpers that run a publisher to completion on the calling thread.
//!
//! Every helper takes a timeout. When it expires the subscription is
//! cancelled and the helper fails with `IllegalState`. An upstream error is
//! returned as is.
//!
//! A virtual-time scheduler never advances while the caller is blocked, so
//! these helpers suit synchronous sources and real-time schedulers only.
//!
//! ```
//! use backflux_exec::BlockExt;
//! use backflux_publisher::{empty, just};
//! use std::time::Duration;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let timeout = Duration::from_secs(1);
//! assert_eq!(just([1, 2, 3]).block_collect(timeout)?, vec![1, 2, 3]);
//! assert_eq!(just([1, 2, 3]).block_first(timeout)?, Some(1));
//! assert_eq!(just([1, 2, 3]).block_last(timeout)?, Some(3));
//! assert_eq!(empty::<i32>().block_last(timeout)?, None);
//! # Ok(())
//! # }
//! ```

use crate::subscribe::subscribe;
use backflux_core::{
    request_upstream, BackfluxError, Latch, Publisher, Result, Subscriber, SubscriptionRef,
    UNBOUNDED,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    First,
    Last,
    All,
}

struct Outcome<T> {
    items: Vec<T>,
    error: Option<BackfluxError>,
}

/// Extension trait providing the blocking helpers.
pub trait BlockExt<T>: Publisher<T> {
    /// Waits for the first item and cancels the rest of the sequence.
    /// `None` if the sequence completed empty.
    ///
    /// # Errors
    /// The upstream error, or `IllegalState` on timeout.
    fn block_first(&self, timeout: Duration) -> Result<Option<T>>;

    /// Waits for completion and returns the last item.
    ///
    /// # Errors
    /// The upstream error, or `IllegalState` on timeout.
    fn block_last(&self, timeout: Duration) -> Result<Option<T>>;

    /// Waits for completion and returns every item in order.
    ///
    /// # Errors
    /// The upstream error, or `IllegalState` on timeout.
    fn block_collect(&self, timeout: Duration) -> Result<Vec<T>>;
}

impl<P, T> BlockExt<T> for P
where
    P: Publisher<T> + ?Sized,
    T: Send + 'static,
{
    fn block_first(&self, timeout: Duration) -> Result<Option<T>> {
        block(self, Mode::First, timeout).map(|items| items.into_iter().next())
    }

    fn block_last(&self, timeout: Duration) -> Result<Option<T>> {
        block(self, Mode::Last, timeout).map(|mut items| items.pop())
    }

    fn block_collect(&self, timeout: Duration) -> Result<Vec<T>> {
        block(self, Mode::All, timeout)
    }
}

fn block<T, P>(publisher: &P, mode: Mode, timeout: Duration) -> Result<Vec<T>>
where
    T: Send + 'static,
    P: Publisher<T> + ?Sized,
{
    let outcome = Arc::new(Mutex::new(Outcome {
        items: Vec::new(),
        error: None,
    }));
    let done = Latch::new();
    let disposable = subscribe(
        publisher,
        BlockingSubscriber {
            outcome: outcome.clone(),
            done: done.clone(),
            mode,
            subscription: None,
        },
    )?;

    if !done.wait_timeout(timeout) {
        disposable.dispose();
        return Err(BackfluxError::illegal_state(format!(
            "no terminal signal within {timeout:?}"
        )));
    }

    let mut outcome = outcome.lock();
    match outcome.error.take() {
        Some(error) => Err(error),
        None => Ok(std::mem::take(&mut outcome.items)),
    }
}

struct BlockingSubscriber<T> {
    outcome: Arc<Mutex<Outcome<T>>>,
    done: Latch,
    mode: Mode,
    subscription: Option<SubscriptionRef>,
}

impl<T: Send + 'static> Subscriber<T> for BlockingSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        let demand = if self.mode == Mode::First { 1 } else { UNBOUNDED };
        self.subscription = Some(subscription.clone());
        request_upstream(subscription.as_ref(), demand);
    }

    fn on_next(&mut self, item: T) {
        if self.done.is_open() {
            return;
        }
        match self.mode {
            Mode::All => self.outcome.lock().items.push(item),
            Mode::Last => {
                let mut outcome = self.outcome.lock();
                outcome.items.clear();
                outcome.items.push(item);
            }
            Mode::First => {
                self.outcome.lock().items.push(item);
                self.done.open();
                if let Some(subscription) = self.subscription.take() {
                    subscription.cancel();
                }
            }
        }
    }

    fn on_error(&mut self, error: BackfluxError) {
        if !self.done.is_open() {
            self.outcome.lock().error = Some(error);
            self.done.open();
        }
    }

    fn on_complete(&mut self) {
        self.done.open();
    }
}
