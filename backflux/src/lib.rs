// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Backflux
//!
//! Demand-driven reactive publishers: nothing is produced until a subscriber
//! asks for it, and no publisher ever emits more than was asked for.
//!
//! ## Overview
//!
//! Backflux is split into small crates, re-exported here:
//!
//! - **[`core`]**: the `Publisher` / `Subscriber` / `Subscription` contract,
//!   the error type and the serialized delivery gate
//! - **[`runtime`]**: schedulers for time-based sources, including a virtual
//!   clock for deterministic tests
//! - **[`publisher`]**: sources (`just`, `from_iter`, `interval`, ...) and
//!   operators (`zip`, `race`, `collect_list`, ...)
//! - **[`exec`]**: drivers that attach a pipeline to callbacks or block until
//!   it terminates
//!
//! ## Quick Start
//!
//! ```rust
//! use backflux::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> backflux::Result<()> {
//! let names = from_iter(vec!["A", "B", "C", "D", "E", "F"])
//!     .zip_with(just(["1", "2", "3", "4"]), |letter, digit| format!("{letter}{digit}"))
//!     .collect_list()
//!     .block_last(Duration::from_secs(1))?;
//!
//! assert_eq!(names, Some(vec!["A1".to_string(), "B2".into(), "C3".into(), "D4".into()]));
//! # Ok(())
//! # }
//! ```
//!
//! ## Time
//!
//! Time-based operators take a [`Scheduler`](runtime::Scheduler). Production
//! code passes a `TokioScheduler`; tests pass a
//! [`VirtualTimeScheduler`](runtime::VirtualTimeScheduler) and move its clock
//! by hand.
//!
//! ```rust
//! use backflux::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use parking_lot::Mutex;
//!
//! # fn main() -> backflux::Result<()> {
//! let scheduler = VirtualTimeScheduler::new();
//! let ticks = Arc::new(Mutex::new(Vec::new()));
//! let sink = ticks.clone();
//!
//! interval_take(Duration::from_millis(100), 10, scheduler.clone())
//!     .subscribe_with(move |tick| sink.lock().push(tick), |_| {}, || {})?;
//!
//! scheduler.advance_by(Duration::from_millis(350));
//! assert_eq!(*ticks.lock(), vec![0, 1, 2]);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

pub use backflux_core as core;
pub use backflux_exec as exec;
pub use backflux_publisher as publisher;
pub use backflux_runtime as runtime;

pub use backflux_core::{BackfluxError, Publisher, Result, Signal, Subscriber, Subscription};
pub use backflux_exec::Disposable;

/// Prelude module for convenient imports
pub mod prelude {
    pub use backflux_core::{
        BackfluxError, BoxPublisher, IntoBackfluxError, Publisher, Result, ResultExt, Signal,
        Subscriber, Subscription, SubscriptionRef, UNBOUNDED,
    };
    pub use backflux_exec::{subscribe, BlockExt, Disposable, SubscribeExt};
    pub use backflux_publisher::prelude::*;
    #[cfg(feature = "runtime-tokio")]
    pub use backflux_runtime::TokioScheduler;
    pub use backflux_runtime::{Scheduler, VirtualTimeScheduler};
}
