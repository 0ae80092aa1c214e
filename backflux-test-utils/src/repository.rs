// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Canned-sequence repository with an optional delay.
//!
//! [`InMemoryRepository`] replays a fixed list of records. With a delay set,
//! `find_first` waits before subscribing and `find_all` spaces its items by
//! the delay, item `k` arriving at `(k + 1) * delay`.
//!
//! ```rust
//! use backflux_runtime::VirtualTimeScheduler;
//! use backflux_test_utils::{marie, InMemoryRepository, ReactiveRepository, Verifier};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), backflux_test_utils::VerifyError> {
//! let scheduler = VirtualTimeScheduler::new();
//! let repository = InMemoryRepository::of(vec![marie()])
//!     .with_delay(Duration::from_millis(250), scheduler.clone());
//!
//! Verifier::create(repository.find_first())
//!     .then_advance(&scheduler, Duration::from_millis(250))
//!     .expect_next([marie()])
//!     .verify_complete()?;
//! # Ok(())
//! # }
//! ```

use crate::test_data::default_users;
use crate::user::User;
use backflux_core::BoxPublisher;
use backflux_publisher::{from_iter, from_option, BoxedExt, DelayExt};
use backflux_runtime::{Scheduler, SchedulerRef};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Read access to a collection of records as publishers.
pub trait ReactiveRepository<T>: Send + Sync {
    /// The first record, or an empty sequence.
    fn find_first(&self) -> BoxPublisher<T>;

    /// Every record, in insertion order.
    fn find_all(&self) -> BoxPublisher<T>;
}

#[derive(Clone)]
pub struct InMemoryRepository<T> {
    records: Vec<T>,
    delay: Option<(Duration, SchedulerRef)>,
}

impl<T> InMemoryRepository<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn of(records: Vec<T>) -> Self {
        Self {
            records,
            delay: None,
        }
    }

    /// Delays every lookup by `delay` on `scheduler`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration, scheduler: impl Scheduler) -> Self {
        self.delay = Some((delay, Arc::new(scheduler)));
        self
    }
}

impl InMemoryRepository<User> {
    /// A repository holding [`default_users`].
    #[must_use]
    pub fn new() -> Self {
        Self::of(default_users())
    }
}

impl Default for InMemoryRepository<User> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReactiveRepository<T> for InMemoryRepository<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn find_first(&self) -> BoxPublisher<T> {
        let source = from_option(self.records.first().cloned());
        match &self.delay {
            Some((delay, scheduler)) => source
                .delay_subscription(*delay, scheduler.clone())
                .boxed(),
            None => source.boxed(),
        }
    }

    fn find_all(&self) -> BoxPublisher<T> {
        let source = from_iter(self.records.clone());
        match &self.delay {
            Some((period, scheduler)) => source
                .delay_elements(*period, scheduler.clone())
                .boxed(),
            None => source.boxed(),
        }
    }
}

impl<T> fmt::Debug for InMemoryRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("records", &self.records.len())
            .field("delay", &self.delay.as_ref().map(|(delay, _)| delay))
            .finish()
    }
}
