// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::{
    BackfluxError, BoxSubscriber, Result, SerializedSubscriber, Subscription, SubscriptionRef,
    SubscriptionSlot,
};
use backflux_runtime::TaskHandle;
use parking_lot::Mutex;
use std::sync::Arc;

/// Pass-through subscription shared by operators that forward demand unchanged.
///
/// Downstream requests go to the upstream slot, which buffers them until the
/// upstream subscription arrives. Cancelling closes the downstream gate, the
/// upstream and any timer the operator registered.
pub(crate) struct Relay<T> {
    pub(crate) downstream: SerializedSubscriber<T>,
    pub(crate) upstream: SubscriptionSlot,
    timer: Mutex<Option<TaskHandle>>,
}

impl<T: Send + 'static> Relay<T> {
    pub(crate) fn new(subscriber: BoxSubscriber<T>) -> Arc<Self> {
        Arc::new(Self {
            downstream: SerializedSubscriber::new(subscriber),
            upstream: SubscriptionSlot::new(),
            timer: Mutex::new(None),
        })
    }

    /// Hands this relay to the downstream as its subscription.
    pub(crate) fn open(self: &Arc<Self>) {
        self.downstream.on_subscribe(self.clone() as SubscriptionRef);
    }

    /// Installs the upstream subscription and opens the downstream.
    pub(crate) fn connect(self: &Arc<Self>, upstream: SubscriptionRef) {
        self.upstream.set(upstream);
        self.open();
    }

    /// Keeps `handle` alive until the relay is cancelled.
    pub(crate) fn hold_timer(&self, handle: TaskHandle) {
        if let Some(previous) = self.timer.lock().replace(handle) {
            previous.cancel();
        }
        // cancel() may have run before the handle was stored
        if self.upstream.is_cancelled() {
            if let Some(timer) = self.timer.lock().take() {
                timer.cancel();
            }
        }
    }

    /// Cancels the upstream and terminates the downstream with `error`.
    pub(crate) fn fail(&self, error: BackfluxError) {
        self.upstream.cancel();
        self.downstream.error(error);
    }
}

impl<T: Send + 'static> Subscription for Relay<T> {
    fn request(&self, n: u64) -> Result<()> {
        self.upstream.request(n)
    }

    fn cancel(&self) {
        self.upstream.cancel();
        if let Some(timer) = self.timer.lock().take() {
            timer.cancel();
        }
        self.downstream.cancel();
    }
}
