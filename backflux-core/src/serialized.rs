// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Serialized delivery gate in front of a downstream subscriber.
//!
//! Every publisher in this workspace talks to its subscriber through a
//! [`SerializedSubscriber`]. The gate owns the downstream and guarantees:
//!
//! - **Mutual exclusion**: signals are queued and delivered by a single
//!   draining thread, so callbacks never interleave even when producers run on
//!   several threads.
//! - **Re-entrancy**: a subscriber may call `request` from inside `on_next`;
//!   signals produced synchronously by that request are queued and delivered
//!   after the current callback returns, never nested inside it.
//! - **At most one terminal**: once `Error` or `Complete` has been accepted,
//!   everything that follows is dropped and logged as a protocol violation.
//! - **Cancellation**: after [`cancel`](SerializedSubscriber::cancel) no
//!   further signal reaches the downstream.
//!
//! ## Example
//!
//! ```
//! use backflux_core::{
//!     BackfluxError, EmptySubscription, SerializedSubscriber, Subscriber, SubscriptionRef,
//! };
//! use std::sync::{Arc, Mutex};
//!
//! struct Recorder(Arc<Mutex<Vec<String>>>);
//!
//! impl Subscriber<i32> for Recorder {
//!     fn on_subscribe(&mut self, _s: SubscriptionRef) {}
//!     fn on_next(&mut self, item: i32) {
//!         self.0.lock().unwrap().push(item.to_string());
//!     }
//!     fn on_error(&mut self, _e: BackfluxError) {}
//!     fn on_complete(&mut self) {
//!         self.0.lock().unwrap().push("done".to_string());
//!     }
//! }
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let gate = SerializedSubscriber::<i32>::new(Box::new(Recorder(log.clone())));
//! gate.on_subscribe(EmptySubscription::shared());
//! gate.next(1);
//! gate.complete();
//! gate.next(2); // dropped: after terminal
//!
//! assert_eq!(*log.lock().unwrap(), vec!["1", "done"]);
//! ```

use crate::error::BackfluxError;
use crate::signal::Signal;
use crate::subscriber::BoxSubscriber;
use crate::subscription::SubscriptionRef;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

enum Event<T> {
    Subscribe(SubscriptionRef),
    Signal(Signal<T>),
}

struct GateState<T> {
    queue: VecDeque<Event<T>>,
    draining: bool,
    subscribed: bool,
    terminated: bool,
    cancelled: bool,
}

struct Gate<T> {
    state: Mutex<GateState<T>>,
    // Only the draining thread locks this, so it is never contended.
    downstream: Mutex<Option<BoxSubscriber<T>>>,
}

/// Cloneable handle to the delivery gate of one subscription.
pub struct SerializedSubscriber<T> {
    gate: Arc<Gate<T>>,
}

impl<T> Clone for SerializedSubscriber<T> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
        }
    }
}

impl<T: Send + 'static> SerializedSubscriber<T> {
    /// Wraps `downstream`. Nothing is delivered until
    /// [`on_subscribe`](Self::on_subscribe) is called.
    #[must_use]
    pub fn new(downstream: BoxSubscriber<T>) -> Self {
        Self {
            gate: Arc::new(Gate {
                state: Mutex::new(GateState {
                    queue: VecDeque::new(),
                    draining: false,
                    subscribed: false,
                    terminated: false,
                    cancelled: false,
                }),
                downstream: Mutex::new(Some(downstream)),
            }),
        }
    }

    /// Hands the subscription to the downstream. Must be the first call.
    pub fn on_subscribe(&self, subscription: SubscriptionRef) {
        {
            let mut state = self.gate.state.lock();
            if state.subscribed {
                drop(state);
                warn!("on_subscribe called twice on the same subscriber: cancelling");
                subscription.cancel();
                return;
            }
            state.subscribed = true;
            // on_subscribe jumps the queue: signals produced while the
            // operator was wiring itself up must still come after it.
            state.queue.push_front(Event::Subscribe(subscription));
            if state.draining {
                return;
            }
            state.draining = true;
        }
        self.drain();
    }

    /// Delivers one item.
    pub fn next(&self, item: T) {
        self.emit(Signal::Next(item));
    }

    /// Delivers the terminal error.
    pub fn error(&self, error: BackfluxError) {
        self.emit(Signal::Error(error));
    }

    /// Delivers the terminal completion.
    pub fn complete(&self) {
        self.emit(Signal::Complete);
    }

    /// Queues `signal` and delivers it unless the gate is closed.
    pub fn emit(&self, signal: Signal<T>) {
        {
            let mut state = self.gate.state.lock();
            if state.cancelled {
                return;
            }
            if state.terminated {
                drop(state);
                let violation = BackfluxError::illegal_state(format!(
                    "{} signal after terminal signal",
                    signal.kind()
                ));
                warn!("dropping signal: {}", violation);
                return;
            }
            if signal.is_terminal() {
                state.terminated = true;
            }
            state.queue.push_back(Event::Signal(signal));
            if state.draining || !state.subscribed {
                return;
            }
            state.draining = true;
        }
        self.drain();
    }

    /// Closes the gate: queued and future signals are discarded and the
    /// downstream is released as soon as no callback is running.
    pub fn cancel(&self) {
        {
            let mut state = self.gate.state.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            state.queue.clear();
        }
        if let Some(mut downstream) = self.gate.downstream.try_lock() {
            downstream.take();
        }
    }

    /// Returns `true` once a terminal signal has been accepted.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.gate.state.lock().terminated
    }

    /// Returns `true` once the gate has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.gate.state.lock().cancelled
    }

    /// Returns `true` when no further signal can reach the downstream.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        let state = self.gate.state.lock();
        state.terminated || state.cancelled
    }

    fn drain(&self) {
        loop {
            let event = {
                let mut state = self.gate.state.lock();
                match state.queue.pop_front() {
                    Some(event) => event,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            let mut downstream = self.gate.downstream.lock();
            // cancel() may have run between the pop and the lock.
            if self.gate.state.lock().cancelled {
                downstream.take();
                continue;
            }
            let Some(subscriber) = downstream.as_mut() else {
                continue;
            };
            let terminal = match event {
                Event::Subscribe(subscription) => {
                    subscriber.on_subscribe(subscription);
                    false
                }
                Event::Signal(signal) => {
                    trace!("delivering {} signal", signal.kind());
                    let terminal = signal.is_terminal();
                    subscriber.on_signal(signal);
                    terminal
                }
            };
            if terminal || self.gate.state.lock().cancelled {
                downstream.take();
            }
        }
    }
}
