// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Scheduler abstraction for time-based publishers.
//!
//! - [`Scheduler`] runs delayed and periodic callbacks without blocking the caller
//! - [`TaskHandle`] cancels a scheduled callback; cancellation is idempotent and
//!   safe from any thread, including from inside the callback itself
//! - [`TokioScheduler`](impls::tokio::TokioScheduler) uses tokio timers
//!   (feature `runtime-tokio`, enabled by default)
//! - [`VirtualTimeScheduler`](impls::virtual_time::VirtualTimeScheduler) keeps a
//!   controllable clock so time-based tests run deterministically

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod impls;
pub mod scheduler;
pub mod task_handle;

pub use self::impls::virtual_time::VirtualTimeScheduler;
pub use self::scheduler::{PeriodicTask, Scheduler, SchedulerRef, Task};
pub use self::task_handle::TaskHandle;

#[cfg(feature = "runtime-tokio")]
pub use self::impls::tokio::TokioScheduler;
