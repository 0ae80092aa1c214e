// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cancel handle for scheduled callbacks.

use core::fmt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Canceller = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a scheduled callback. Clones share the same state.
///
/// # Example
///
/// ```
/// use backflux_runtime::TaskHandle;
///
/// let handle = TaskHandle::new();
/// assert!(!handle.is_cancelled());
///
/// handle.cancel();
/// handle.cancel();
/// assert!(handle.is_cancelled());
/// ```
#[derive(Clone)]
pub struct TaskHandle {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    canceller: Mutex<Option<Canceller>>,
}

impl TaskHandle {
    /// Creates a live handle with no release hook.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                canceller: Mutex::new(None),
            }),
        }
    }

    /// Registers the hook that releases the scheduler resources behind this
    /// handle (timer task, queue entry). Runs immediately if the handle is
    /// already cancelled.
    pub fn on_cancel(&self, canceller: impl FnOnce() + Send + 'static) {
        {
            let mut slot = self.inner.canceller.lock();
            if !self.is_cancelled() {
                *slot = Some(Box::new(canceller));
                return;
            }
        }
        canceller();
    }

    /// Cancels the callback. Idempotent, callable from any thread and from
    /// inside the callback.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let canceller = self.inner.canceller.lock().take();
        if let Some(canceller) = canceller {
            trace!("releasing cancelled scheduler task");
            canceller();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }
}

impl Default for TaskHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
