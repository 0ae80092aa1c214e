// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Zip operator - pairs items from several publishers by position.
//!
//! Zip subscribes to every source, buffers what each one emits, and as soon as
//! every buffer holds at least one item (and the downstream has demand) it
//! takes the head of each buffer and passes them to the combiner.
//!
//! # Behavior
//!
//! - A downstream `request(n)` is forwarded as `request(n)` to every source
//! - The sequence completes as soon as any source has completed and its
//!   buffer is empty; the other sources are cancelled
//! - The first error from any source, or from the combiner, is forwarded and
//!   every source is cancelled
//! - Items are combined in source order regardless of arrival order
//!
//! # Examples
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::{from_iter, just, zip};
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::unbounded();
//! zip(
//!     just(["A", "B", "C", "D", "E", "F"]),
//!     from_iter(1..=4),
//!     |letter, n| format!("{letter}{n}"),
//! )
//! .subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec!["A1", "B2", "C3", "D4"]);
//! assert!(subscriber.is_completed());
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`race`](crate::race) - forward whichever source signals first

use crate::map::MapExt;
use backflux_core::{
    validate_demand, BackfluxError, BoxPublisher, BoxSubscriber, Demand, Publisher, Result,
    SerializedSubscriber, Subscriber, Subscription, SubscriptionRef, SubscriptionSlot,
    WorkInProgress,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

type Combiner<T, R> = Arc<dyn Fn(Vec<T>) -> Result<R> + Send + Sync>;

/// Zips any number of publishers of the same item type.
///
/// The combiner receives one item per source, in source order. An empty
/// source list completes immediately.
pub struct ZipAll<T, R> {
    sources: Vec<BoxPublisher<T>>,
    combiner: Combiner<T, R>,
}

/// Zips a homogeneous list of publishers with a fallible combiner.
pub fn zip_all<T, R, F>(sources: Vec<BoxPublisher<T>>, combiner: F) -> ZipAll<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(Vec<T>) -> Result<R> + Send + Sync + 'static,
{
    ZipAll {
        sources,
        combiner: Arc::new(combiner),
    }
}

/// Zips two publishers with an infallible combiner.
pub fn zip<A, B, R, PA, PB, F>(first: PA, second: PB, combiner: F) -> ZipAll<Either<A, B>, R>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    PA: Publisher<A> + 'static,
    PB: Publisher<B> + 'static,
    F: Fn(A, B) -> R + Send + Sync + 'static,
{
    try_zip(first, second, move |a, b| Ok(combiner(a, b)))
}

/// Zips two publishers with a combiner that may fail.
///
/// A combiner error cancels both sources and terminates the sequence.
pub fn try_zip<A, B, R, PA, PB, F>(first: PA, second: PB, combiner: F) -> ZipAll<Either<A, B>, R>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Send + 'static,
    PA: Publisher<A> + 'static,
    PB: Publisher<B> + 'static,
    F: Fn(A, B) -> Result<R> + Send + Sync + 'static,
{
    let left: BoxPublisher<Either<A, B>> =
        Arc::new(MapExt::<A>::map(first, Either::<A, B>::Left));
    let right: BoxPublisher<Either<A, B>> =
        Arc::new(MapExt::<B>::map(second, Either::<A, B>::Right));
    zip_all(vec![left, right], move |mut row: Vec<Either<A, B>>| {
        match (row.pop(), row.pop()) {
            (Some(Either::Right(b)), Some(Either::Left(a))) => combiner(a, b),
            _ => Err(BackfluxError::illegal_state("zip row out of source order")),
        }
    })
}

/// Zips three publishers with an infallible combiner.
pub fn zip3<A, B, C, R, PA, PB, PC, F>(
    first: PA,
    second: PB,
    third: PC,
    combiner: F,
) -> ZipAll<Either<(A, B), C>, R>
where
    A: Send + 'static,
    B: Send + 'static,
    C: Send + 'static,
    R: Send + 'static,
    PA: Publisher<A> + 'static,
    PB: Publisher<B> + 'static,
    PC: Publisher<C> + 'static,
    F: Fn(A, B, C) -> R + Send + Sync + 'static,
{
    zip(zip(first, second, |a, b| (a, b)), third, move |(a, b), c| {
        combiner(a, b, c)
    })
}

/// Item slot used to zip publishers of different types through [`ZipAll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Either<A, B> {
    /// From the first source
    Left(A),
    /// From the second source
    Right(B),
}

/// Extension trait providing the `zip_with` operator.
pub trait ZipWithExt<T>: Publisher<T> + Sized + 'static {
    /// Pairs each item with the item at the same position in `other`.
    ///
    /// See the [module-level documentation](crate::zip) for details.
    fn zip_with<U, R, P, F>(self, other: P, combiner: F) -> ZipAll<Either<T, U>, R>
    where
        U: Send + 'static,
        R: Send + 'static,
        P: Publisher<U> + 'static,
        F: Fn(T, U) -> R + Send + Sync + 'static;
}

impl<S, T> ZipWithExt<T> for S
where
    S: Publisher<T> + 'static,
    T: Send + 'static,
{
    fn zip_with<U, R, P, F>(self, other: P, combiner: F) -> ZipAll<Either<T, U>, R>
    where
        U: Send + 'static,
        R: Send + 'static,
        P: Publisher<U> + 'static,
        F: Fn(T, U) -> R + Send + Sync + 'static,
    {
        zip(self, other, combiner)
    }
}

impl<T, R> Publisher<R> for ZipAll<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<R>) -> Result<()> {
        let arity = self.sources.len();
        let coordinator = Arc::new(ZipCoordinator {
            downstream: SerializedSubscriber::new(subscriber),
            combiner: self.combiner.clone(),
            state: Mutex::new(ZipState {
                buffers: (0..arity).map(|_| VecDeque::new()).collect(),
                done: vec![false; arity],
                error: None,
                terminated: false,
            }),
            upstreams: (0..arity).map(|_| SubscriptionSlot::new()).collect(),
            demand: Demand::new(),
            wip: WorkInProgress::new(),
        });
        coordinator
            .downstream
            .on_subscribe(coordinator.clone() as SubscriptionRef);

        if arity == 0 {
            coordinator.finish(Terminal::Complete);
            return Ok(());
        }

        for (index, source) in self.sources.iter().enumerate() {
            if coordinator.is_terminated() {
                break;
            }
            let inner = ZipInner {
                coordinator: coordinator.clone(),
                index,
            };
            if let Err(error) = source.subscribe(Box::new(inner)) {
                coordinator.on_inner_error(index, error);
            }
        }
        Ok(())
    }
}

struct ZipState<T> {
    buffers: Vec<VecDeque<T>>,
    done: Vec<bool>,
    error: Option<BackfluxError>,
    terminated: bool,
}

impl<T> ZipState<T> {
    fn terminate(&mut self) {
        self.terminated = true;
        self.buffers.iter_mut().for_each(VecDeque::clear);
    }
}

enum Terminal {
    Complete,
    Error(BackfluxError),
}

enum Step<T> {
    Row(Vec<T>),
    Finish(Terminal),
    Idle,
}

struct ZipCoordinator<T, R> {
    downstream: SerializedSubscriber<R>,
    combiner: Combiner<T, R>,
    state: Mutex<ZipState<T>>,
    upstreams: Vec<SubscriptionSlot>,
    demand: Demand,
    wip: WorkInProgress,
}

impl<T, R> ZipCoordinator<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn is_terminated(&self) -> bool {
        self.state.lock().terminated
    }

    fn on_inner_next(&self, index: usize, item: T) {
        {
            let mut state = self.state.lock();
            if state.terminated {
                return;
            }
            state.buffers[index].push_back(item);
        }
        self.drain();
    }

    fn on_inner_error(&self, index: usize, error: BackfluxError) {
        {
            let mut state = self.state.lock();
            if state.terminated || state.error.is_some() {
                return;
            }
            trace!("zip source {} failed", index);
            state.error = Some(error);
        }
        self.drain();
    }

    fn on_inner_complete(&self, index: usize) {
        {
            let mut state = self.state.lock();
            if state.terminated {
                return;
            }
            state.done[index] = true;
        }
        self.drain();
    }

    fn cancel_upstreams(&self) {
        for upstream in &self.upstreams {
            upstream.cancel();
        }
    }

    fn finish(&self, terminal: Terminal) {
        self.state.lock().terminate();
        self.cancel_upstreams();
        match terminal {
            Terminal::Complete => {
                debug!("zip completed");
                self.downstream.complete();
            }
            Terminal::Error(error) => self.downstream.error(error),
        }
    }

    fn next_step(&self) -> Step<T> {
        let mut state = self.state.lock();
        if state.terminated {
            return Step::Idle;
        }
        if let Some(error) = state.error.take() {
            state.terminate();
            return Step::Finish(Terminal::Error(error));
        }
        let exhausted = state
            .done
            .iter()
            .zip(&state.buffers)
            .any(|(done, buffer)| *done && buffer.is_empty());
        if exhausted {
            state.terminate();
            return Step::Finish(Terminal::Complete);
        }
        if state.buffers.iter().any(VecDeque::is_empty) || !self.demand.try_take() {
            return Step::Idle;
        }
        let row = state
            .buffers
            .iter_mut()
            .filter_map(VecDeque::pop_front)
            .collect();
        Step::Row(row)
    }

    fn drain(&self) {
        self.wip.drain(|| loop {
            match self.next_step() {
                Step::Idle => return,
                Step::Finish(terminal) => {
                    self.finish(terminal);
                    return;
                }
                Step::Row(row) => match (self.combiner)(row) {
                    Ok(combined) => self.downstream.next(combined),
                    Err(error) => {
                        self.finish(Terminal::Error(error));
                        return;
                    }
                },
            }
        });
    }
}

impl<T, R> Subscription for ZipCoordinator<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn request(&self, n: u64) -> Result<()> {
        validate_demand(n)?;
        self.demand.add(n);
        for upstream in &self.upstreams {
            upstream.request(n)?;
        }
        self.drain();
        Ok(())
    }

    fn cancel(&self) {
        self.state.lock().terminate();
        self.cancel_upstreams();
        self.downstream.cancel();
    }
}

struct ZipInner<T, R> {
    coordinator: Arc<ZipCoordinator<T, R>>,
    index: usize,
}

impl<T, R> Subscriber<T> for ZipInner<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.coordinator.upstreams[self.index].set(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.coordinator.on_inner_next(self.index, item);
    }

    fn on_error(&mut self, error: BackfluxError) {
        self.coordinator.on_inner_error(self.index, error);
    }

    fn on_complete(&mut self) {
        self.coordinator.on_inner_complete(self.index);
    }
}
