// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core contracts of the Backflux reactive streams engine.
//!
//! Data flows downstream as [`Signal`]s (publisher → operator → subscriber),
//! while demand and cancellation flow upstream through a [`Subscription`].
//!
//! - [`Publisher`] produces a sequence for each subscriber it is given
//! - [`Subscriber`] consumes `on_next` / `on_error` / `on_complete`
//! - [`Subscription`] carries `request(n)` and `cancel()` back upstream
//! - [`SerializedSubscriber`] is the delivery gate every operator emits through:
//!   it never delivers two signals concurrently and drops anything that
//!   follows a terminal signal
//! - [`WorkInProgress`] is the drain primitive operators use so that
//!   concurrent producers cannot reorder output
//!
//! # Example
//!
//! ```
//! use backflux_core::{Demand, UNBOUNDED};
//!
//! let demand = Demand::new();
//! demand.add(2);
//! assert!(demand.try_take());
//! assert!(demand.try_take());
//! assert!(!demand.try_take());
//!
//! demand.add(UNBOUNDED);
//! assert!(demand.is_unbounded());
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod demand;
pub mod drain;
pub mod error;
pub mod latch;
pub mod publisher;
pub mod serialized;
pub mod signal;
pub mod subscriber;
pub mod subscription;

pub use self::demand::{validate_demand, Demand, UNBOUNDED};
pub use self::drain::WorkInProgress;
pub use self::error::{BackfluxError, IntoBackfluxError, Result, ResultExt};
pub use self::latch::Latch;
pub use self::publisher::{BoxPublisher, Publisher};
pub use self::serialized::SerializedSubscriber;
pub use self::signal::Signal;
pub use self::subscriber::{BoxSubscriber, Subscriber};
pub use self::subscription::{
    request_upstream, EmptySubscription, SubscriptionRef, Subscription, SubscriptionSlot,
};
