// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use backflux_core::SerializedSubscriber;
use parking_lot::Mutex;

struct ScalarState<T> {
    value: Option<T>,
    requested: bool,
    done: bool,
}

/// Emits one final value followed by `Complete`, but only once the
/// downstream has asked for at least one item.
///
/// Whichever of [`request`](Self::request) and [`resolve`](Self::resolve)
/// comes second performs the emission.
pub(crate) struct DeferredScalar<T> {
    state: Mutex<ScalarState<T>>,
    downstream: SerializedSubscriber<T>,
}

impl<T: Send + 'static> DeferredScalar<T> {
    pub(crate) fn new(downstream: SerializedSubscriber<T>) -> Self {
        Self {
            state: Mutex::new(ScalarState {
                value: None,
                requested: false,
                done: false,
            }),
            downstream,
        }
    }

    /// Records downstream demand.
    pub(crate) fn request(&self) {
        let value = {
            let mut state = self.state.lock();
            state.requested = true;
            if state.done {
                return;
            }
            match state.value.take() {
                Some(value) => {
                    state.done = true;
                    value
                }
                None => return,
            }
        };
        self.emit(value);
    }

    /// Supplies the value to emit.
    pub(crate) fn resolve(&self, value: T) {
        {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            if !state.requested {
                state.value = Some(value);
                return;
            }
            state.done = true;
        }
        self.emit(value);
    }

    /// Drops any pending value. Nothing is emitted afterwards.
    pub(crate) fn cancel(&self) {
        let mut state = self.state.lock();
        state.done = true;
        state.value = None;
    }

    fn emit(&self, value: T) {
        self.downstream.next(value);
        self.downstream.complete();
    }
}
