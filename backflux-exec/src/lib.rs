// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Drivers that attach consumers to Backflux publishers.
//!
//! - [`subscribe`] and [`SubscribeExt::subscribe_with`] start a subscription
//!   and hand back a [`Disposable`]
//! - [`BlockExt`] runs a publisher to completion on the calling thread
//!   (`block_first`, `block_last`, `block_collect`), bounded by a timeout

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod block;
pub mod disposable;
pub mod subscribe;

pub use block::BlockExt;
pub use disposable::Disposable;
pub use subscribe::{subscribe, SubscribeExt};
