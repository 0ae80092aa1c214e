// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Step-by-step expectations over a publisher.
//!
//! A [`Verifier`] collects a script of expectations and demand operations,
//! subscribes when a terminal `verify_*` method is called, and replays the
//! script against a [`TestSubscriber`]. Every wait is bounded by a timeout
//! (five seconds unless changed).
//!
//! Waiting blocks the calling thread. Publishers driven by a
//! [`VirtualTimeScheduler`] are advanced with
//! [`then_advance`](Verifier::then_advance); publishers on a real timer need a
//! multi-threaded runtime.
//!
//! ```rust
//! use backflux_publisher::just;
//! use backflux_test_utils::Verifier;
//!
//! # fn main() -> Result<(), backflux_test_utils::VerifyError> {
//! Verifier::create(just(["foo", "bar"]))
//!     .expect_next(["foo", "bar"])
//!     .verify_complete()?;
//!
//! Verifier::create(just([1, 2, 3]))
//!     .with_initial_demand(1)
//!     .expect_next([1])
//!     .then_request(2)
//!     .expect_next_count(2)
//!     .verify_complete()?;
//! # Ok(())
//! # }
//! ```

use crate::test_subscriber::TestSubscriber;
use backflux_core::{BackfluxError, BoxPublisher, Publisher, UNBOUNDED};
use backflux_runtime::VirtualTimeScheduler;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Reasons a verification fails.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("subscribe failed: {0}")]
    Subscribe(#[source] BackfluxError),

    #[error("request rejected: {0}")]
    Request(#[source] BackfluxError),

    #[error("expected item #{index} to be {expected}, got {actual}")]
    UnexpectedItem {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("expected {expected} items, got {actual}")]
    MissingItems { expected: usize, actual: usize },

    #[error("unexpected items before the terminal signal: {items}")]
    UnexpectedItems { items: String },

    #[error("expected completion, got {0}")]
    ExpectedComplete(String),

    #[error("expected an error, got {0}")]
    ExpectedError(String),

    #[error("expected error `{expected}`, got `{actual}`")]
    WrongError {
        expected: BackfluxError,
        actual: BackfluxError,
    },
}

enum Step<T> {
    ExpectNext(Vec<T>),
    ExpectNextCount(usize),
    Request(u64),
    Cancel,
    Advance(VirtualTimeScheduler, Duration),
}

/// Scripted expectations over one subscription. See the [module docs](self).
pub struct Verifier<T> {
    publisher: BoxPublisher<T>,
    initial_demand: u64,
    timeout: Duration,
    steps: Vec<Step<T>>,
}

impl<T> Verifier<T>
where
    T: Clone + PartialEq + Debug + Send + 'static,
{
    /// Starts a script over `publisher` with unbounded initial demand.
    pub fn create(publisher: impl Publisher<T> + 'static) -> Self {
        Self {
            publisher: Arc::new(publisher),
            initial_demand: UNBOUNDED,
            timeout: DEFAULT_TIMEOUT,
            steps: Vec::new(),
        }
    }

    /// Requests only `n` items on subscription; zero requests nothing.
    #[must_use]
    pub fn with_initial_demand(mut self, n: u64) -> Self {
        self.initial_demand = n;
        self
    }

    /// Bound for every wait in the script.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Expects exactly these items next, in order.
    #[must_use]
    pub fn expect_next(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.steps.push(Step::ExpectNext(items.into_iter().collect()));
        self
    }

    /// Expects `count` more items without checking their values.
    #[must_use]
    pub fn expect_next_count(mut self, count: usize) -> Self {
        self.steps.push(Step::ExpectNextCount(count));
        self
    }

    #[must_use]
    pub fn then_request(mut self, n: u64) -> Self {
        self.steps.push(Step::Request(n));
        self
    }

    #[must_use]
    pub fn then_cancel(mut self) -> Self {
        self.steps.push(Step::Cancel);
        self
    }

    /// Moves `scheduler`'s clock forward by `by`.
    #[must_use]
    pub fn then_advance(mut self, scheduler: &VirtualTimeScheduler, by: Duration) -> Self {
        self.steps.push(Step::Advance(scheduler.clone(), by));
        self
    }

    /// Runs the script and expects `Complete` with no further items.
    ///
    /// # Errors
    /// The first expectation that did not hold.
    pub fn verify_complete(self) -> Result<(), VerifyError> {
        let timeout = self.timeout;
        let (subscriber, cursor) = self.run()?;
        if !subscriber.wait_terminal(timeout) {
            return Err(VerifyError::ExpectedComplete("no terminal signal".into()));
        }
        check_no_extra_items(&subscriber, cursor)?;
        match subscriber.error() {
            Some(error) => Err(VerifyError::ExpectedComplete(format!("error `{error}`"))),
            None => Ok(()),
        }
    }

    /// Runs the script, expects an `Error`, and returns it.
    ///
    /// # Errors
    /// The first expectation that did not hold.
    pub fn verify_error(self) -> Result<BackfluxError, VerifyError> {
        let timeout = self.timeout;
        let (subscriber, cursor) = self.run()?;
        if !subscriber.wait_terminal(timeout) {
            return Err(VerifyError::ExpectedError("no terminal signal".into()));
        }
        check_no_extra_items(&subscriber, cursor)?;
        subscriber
            .error()
            .ok_or_else(|| VerifyError::ExpectedError("completion".into()))
    }

    /// Runs the script and expects exactly `expected` as the terminal error.
    ///
    /// # Errors
    /// The first expectation that did not hold.
    pub fn expect_error(self, expected: &BackfluxError) -> Result<(), VerifyError> {
        let actual = self.verify_error()?;
        if &actual == expected {
            Ok(())
        } else {
            Err(VerifyError::WrongError {
                expected: expected.clone(),
                actual,
            })
        }
    }

    /// Runs the script without expecting a terminal signal.
    ///
    /// Use after [`then_cancel`](Self::then_cancel).
    ///
    /// # Errors
    /// The first expectation that did not hold.
    pub fn verify(self) -> Result<TestSubscriber<T>, VerifyError> {
        self.run().map(|(subscriber, _)| subscriber)
    }

    fn run(self) -> Result<(TestSubscriber<T>, usize), VerifyError> {
        let subscriber = TestSubscriber::with_demand(self.initial_demand);
        self.publisher
            .subscribe(subscriber.boxed())
            .map_err(VerifyError::Subscribe)?;

        let mut cursor = 0;
        for step in self.steps {
            match step {
                Step::ExpectNext(expected) => {
                    let target = cursor + expected.len();
                    wait_for(&subscriber, target, self.timeout)?;
                    let items = subscriber.items();
                    for (offset, (actual, expected)) in
                        items[cursor..target].iter().zip(&expected).enumerate()
                    {
                        if actual != expected {
                            return Err(VerifyError::UnexpectedItem {
                                index: cursor + offset,
                                expected: format!("{expected:?}"),
                                actual: format!("{actual:?}"),
                            });
                        }
                    }
                    cursor = target;
                }
                Step::ExpectNextCount(count) => {
                    cursor += count;
                    wait_for(&subscriber, cursor, self.timeout)?;
                }
                Step::Request(n) => subscriber.request(n).map_err(VerifyError::Request)?,
                Step::Cancel => subscriber.cancel(),
                Step::Advance(scheduler, by) => scheduler.advance_by(by),
            }
        }
        Ok((subscriber, cursor))
    }
}

fn wait_for<T: Send + 'static>(
    subscriber: &TestSubscriber<T>,
    count: usize,
    timeout: Duration,
) -> Result<(), VerifyError> {
    if subscriber.wait_items(count, timeout) {
        Ok(())
    } else {
        Err(VerifyError::MissingItems {
            expected: count,
            actual: subscriber.item_count(),
        })
    }
}

fn check_no_extra_items<T>(subscriber: &TestSubscriber<T>, cursor: usize) -> Result<(), VerifyError>
where
    T: Clone + Debug + Send + 'static,
{
    let items = subscriber.items();
    if items.len() > cursor {
        return Err(VerifyError::UnexpectedItems {
            items: format!("{:?}", &items[cursor..]),
        });
    }
    Ok(())
}
