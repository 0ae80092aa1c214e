// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting all sources and operator traits.
//!
//! ```
//! use backflux_publisher::prelude::*;
//! ```
//!
//! # Contents
//!
//! ## Extension Traits (Operators)
//!
//! - [`BoxedExt`] - Type-erase a publisher
//! - [`CollectListExt`] - Gather all items into one `Vec`
//! - [`DefaultIfEmptyExt`] - Fallback for empty sequences
//! - [`DelayExt`] - Delay subscription or items
//! - [`MapExt`] - Transform items
//! - [`RaceWithExt`] - Mirror the first source to signal
//! - [`TakeExt`] - Take first n items
//! - [`ThenEmptyExt`] - Keep only the terminal signal
//! - [`ZipWithExt`] - Combine items by position
//!
//! ## Sources
//!
//! - [`just`], [`from_iter`], [`from_iterator`], [`from_option`], [`empty`]
//! - [`error`], [`never`]
//! - [`interval`], [`interval_take`]
//! - [`zip`], [`zip3`], [`zip_all`], [`try_zip`], [`race`]

pub use crate::{
    empty, error, from_iter, from_iterator, from_option, interval, interval_take, just, never,
    race, try_zip, zip, zip3, zip_all, BoxedExt, CollectListExt, DefaultIfEmptyExt, DelayExt,
    MapExt, RaceWithExt, TakeExt, ThenEmptyExt, ZipWithExt,
};
