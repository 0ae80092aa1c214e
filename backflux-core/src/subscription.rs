// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand and cancellation handles flowing upstream.

use crate::demand::{saturating_add, validate_demand};
use crate::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// The live relationship between one publisher and one subscriber.
///
/// Both methods may be called from any thread, including from inside a
/// signal callback of the subscriber that owns the subscription.
pub trait Subscription: Send + Sync {
    /// Authorizes the publisher to emit up to `n` more items.
    ///
    /// # Errors
    /// Returns [`BackfluxError::InvalidDemand`](crate::BackfluxError::InvalidDemand)
    /// when `n` is zero.
    fn request(&self, n: u64) -> Result<()>;

    /// Stops the flow of signals and releases resources. Idempotent.
    fn cancel(&self);
}

/// Shared handle to a subscription.
pub type SubscriptionRef = Arc<dyn Subscription>;

/// Forwards demand that is already known to be positive.
///
/// Operators use this when relaying downstream demand; a failure here can only
/// mean a misbehaving upstream and is logged rather than propagated.
pub fn request_upstream(subscription: &dyn Subscription, n: u64) {
    if let Err(error) = subscription.request(n) {
        warn!("upstream rejected request({}): {}", n, error);
    }
}

/// Subscription for sources that never look at demand (e.g. `error`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl EmptySubscription {
    /// Returns a shared instance.
    #[must_use]
    pub fn shared() -> SubscriptionRef {
        Arc::new(Self)
    }
}

impl Subscription for EmptySubscription {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n).map(|_| ())
    }

    fn cancel(&self) {}
}

#[derive(Default)]
struct SlotState {
    upstream: Option<SubscriptionRef>,
    pending: u64,
    cancelled: bool,
}

/// A subscription handed out before the real upstream subscription exists.
///
/// Demand requested early is accumulated and replayed once [`set`](Self::set)
/// installs the upstream; a cancel issued early cancels the upstream the moment
/// it arrives.
#[derive(Default)]
pub struct SubscriptionSlot {
    state: Mutex<SlotState>,
}

impl SubscriptionSlot {
    /// Creates an empty, uncancelled slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the upstream subscription.
    ///
    /// Replays accumulated demand. If the slot was cancelled, or already holds
    /// a subscription, the incoming one is cancelled instead.
    pub fn set(&self, upstream: SubscriptionRef) {
        let pending = {
            let mut state = self.state.lock();
            if state.cancelled {
                drop(state);
                upstream.cancel();
                return;
            }
            if state.upstream.is_some() {
                drop(state);
                warn!("subscription slot already set: cancelling duplicate upstream");
                upstream.cancel();
                return;
            }
            state.upstream = Some(upstream.clone());
            std::mem::take(&mut state.pending)
        };

        if pending > 0 {
            request_upstream(upstream.as_ref(), pending);
        }
    }

    /// Returns `true` once [`cancel`](Subscription::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// Returns `true` once an upstream has been installed.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.state.lock().upstream.is_some()
    }
}

impl Subscription for SubscriptionSlot {
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        let upstream = {
            let mut state = self.state.lock();
            if state.cancelled {
                return Ok(());
            }
            match &state.upstream {
                Some(upstream) => upstream.clone(),
                None => {
                    state.pending = saturating_add(state.pending, n);
                    return Ok(());
                }
            }
        };
        upstream.request(n)
    }

    fn cancel(&self) {
        let upstream = {
            let mut state = self.state.lock();
            state.cancelled = true;
            state.pending = 0;
            state.upstream.take()
        };
        if let Some(upstream) = upstream {
            upstream.cancel();
        }
    }
}
