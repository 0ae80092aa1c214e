// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{Latch, Subscription, SubscriptionRef, SubscriptionSlot};
use std::sync::Arc;
use std::time::Duration;

/// Handle to a running subscription.
///
/// Clones refer to the same subscription. [`dispose`](Self::dispose) cancels
/// it; calling it again, or after the sequence terminated, has no effect.
#[derive(Clone)]
pub struct Disposable {
    upstream: Arc<SubscriptionSlot>,
    terminal: Latch,
}

impl Disposable {
    pub(crate) fn new() -> Self {
        Self {
            upstream: Arc::new(SubscriptionSlot::new()),
            terminal: Latch::new(),
        }
    }

    pub(crate) fn attach(&self, subscription: SubscriptionRef) {
        self.upstream.set(subscription);
    }

    pub(crate) fn mark_terminated(&self) {
        self.terminal.open();
    }

    /// Cancels the subscription. Idempotent.
    pub fn dispose(&self) {
        if !self.upstream.is_cancelled() {
            trace!("disposing subscription");
        }
        self.upstream.cancel();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.upstream.is_cancelled()
    }

    /// `true` once the subscriber received `on_error` or `on_complete`.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminal.is_open()
    }

    /// Blocks until the sequence terminates or `timeout` elapses.
    #[must_use]
    pub fn wait_terminal(&self, timeout: Duration) -> bool {
        self.terminal.wait_timeout(timeout)
    }

    /// Resolves once the sequence terminates.
    pub async fn terminated(&self) {
        self.terminal.wait().await;
    }
}

impl std::fmt::Debug for Disposable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
