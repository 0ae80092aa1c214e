// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One-shot latch usable from both blocking and async code.
//!
//! The driver's blocking helpers and the test harness park on a [`Latch`]
//! until a subscriber observes its terminal signal.

use event_listener::{Event, EventListener, Listener};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// One-shot latch. Clones share the same state.
///
/// # Example
///
/// ```
/// use backflux_core::Latch;
/// use std::time::Duration;
///
/// let latch = Latch::new();
/// let opener = latch.clone();
/// std::thread::spawn(move || opener.open());
///
/// assert!(latch.wait_timeout(Duration::from_secs(5)));
/// assert!(latch.is_open());
/// ```
#[derive(Clone, Debug)]
pub struct Latch {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    open: AtomicBool,
    event: Event,
}

impl Latch {
    /// Create a closed latch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                open: AtomicBool::new(false),
                event: Event::new(),
            }),
        }
    }

    /// Open the latch, waking every waiter. Idempotent.
    pub fn open(&self) {
        self.inner.open.store(true, Ordering::Release);
        self.inner.event.notify(usize::MAX);
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    /// Block the current thread until the latch opens or `timeout` elapses.
    ///
    /// Returns `true` if the latch is open. A timeout too large to form a
    /// deadline waits without one.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            if self.is_open() {
                return true;
            }
            let listener = self.inner.event.listen();
            // Re-check after registering: open() may have run in between.
            if self.is_open() {
                return true;
            }
            match deadline {
                Some(deadline) => {
                    if listener.wait_deadline(deadline).is_none() {
                        return self.is_open();
                    }
                }
                None => listener.wait(),
            }
        }
    }

    /// Wait asynchronously until the latch opens.
    pub fn wait(&self) -> Wait<'_> {
        Wait {
            latch: self,
            listener: None,
        }
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`Latch::wait()`].
pub struct Wait<'a> {
    latch: &'a Latch,
    listener: Option<EventListener>,
}

impl Future for Wait<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = &mut *self;
        loop {
            if this.latch.is_open() {
                return Poll::Ready(());
            }

            let Some(listener) = this.listener.as_mut() else {
                this.listener = Some(this.latch.inner.event.listen());
                continue;
            };
            match Pin::new(listener).poll(cx) {
                Poll::Ready(()) => this.listener = None,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
