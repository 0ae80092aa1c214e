// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sources and operators for demand-driven publishers.
//!
//! Everything in this crate implements [`Publisher`](backflux_core::Publisher):
//! nothing is produced until a subscriber requests it, and no publisher emits
//! more items than were requested.
//!
//! # Architecture
//!
//! - **Sources** create sequences from values, iterators, errors or time
//! - **Extension traits**: each operator is provided via an extension trait
//!   implemented for every publisher, so operators chain fluently
//! - **Serialized delivery**: every publisher talks to its subscriber through
//!   a [`SerializedSubscriber`](backflux_core::SerializedSubscriber), so
//!   callbacks never overlap and nothing follows a terminal signal
//!
//! ## Sources
//!
//! - **[`just`]**, **[`from_iter`]**, **[`from_iterator`]**, **[`from_option`]**,
//!   **[`empty`]**: in-memory sequences
//! - **[`error`]**: fails immediately
//! - **[`never`]**: stays silent
//! - **[`interval`]**, **[`interval_take`]**: periodic ticks on a scheduler
//!
//! ## Operators
//!
//! ### Combination
//!
//! - **[`zip`]**, **[`zip3`]**, **[`zip_all`]**, **[`try_zip`]**,
//!   **[`zip_with`](ZipWithExt::zip_with)**: combine items by position
//! - **[`race`]**, **[`race_with`](RaceWithExt::race_with)**: mirror the
//!   first source to signal
//!
//! ### Transformation
//!
//! - **[`map`](MapExt::map)**, **[`try_map`](MapExt::try_map)**
//! - **[`take`](TakeExt::take)**
//! - **[`collect_list`](CollectListExt::collect_list)**
//! - **[`default_if_empty`](DefaultIfEmptyExt::default_if_empty)**
//! - **[`then_empty`](ThenEmptyExt::then_empty)**
//!
//! ### Time
//!
//! - **[`delay_subscription`](DelayExt::delay_subscription)**
//! - **[`delay_elements`](DelayExt::delay_elements)**
//!
//! # Example
//!
//! ```
//! use backflux_core::Publisher;
//! use backflux_publisher::prelude::*;
//! use backflux_test_utils::TestSubscriber;
//!
//! # fn main() -> backflux_core::Result<()> {
//! let subscriber = TestSubscriber::unbounded();
//! from_iter(1..=5)
//!     .map(|n| n * 10)
//!     .take(3)
//!     .collect_list()
//!     .subscribe(subscriber.boxed())?;
//!
//! assert_eq!(subscriber.items(), vec![vec![10, 20, 30]]);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
pub mod boxed;
pub mod collect_list;
pub mod default_if_empty;
pub mod delay;
pub mod error;
pub mod interval;
pub mod iterable;
pub mod map;
pub mod never;
pub mod prelude;
pub mod race;
mod relay;
mod scalar;
pub mod take;
pub mod then_empty;
pub mod zip;

pub use boxed::BoxedExt;
pub use collect_list::{CollectList, CollectListExt};
pub use default_if_empty::{DefaultIfEmpty, DefaultIfEmptyExt};
pub use delay::{DelayElements, DelayExt, DelaySubscription};
pub use error::{error, ErrorPublisher};
pub use interval::{interval, interval_take, Interval};
pub use iterable::{empty, from_iter, from_iterator, from_option, just, FromIter, FromIterator};
pub use map::{Map, MapExt, TryMap};
pub use never::{never, Never};
pub use race::{race, Race, RaceWithExt};
pub use take::{Take, TakeExt};
pub use then_empty::{ThenEmpty, ThenEmptyExt};
pub use zip::{try_zip, zip, zip3, zip_all, Either, ZipAll, ZipWithExt};
