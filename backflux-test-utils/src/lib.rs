// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Backflux reactive streams engine.
//!
//! This crate is meant for development and testing only.
//!
//! # Key Types
//!
//! - [`TestSubscriber`] records every signal and lets the test drive demand
//!   and cancellation by hand
//! - [`Verifier`] runs a script of expectations against a publisher
//! - [`PublisherProbe`] records whether a publisher was subscribed, requested
//!   or cancelled
//! - [`ErrorInjectingPublisher`] fails a sequence at a chosen position
//! - [`User`], the [`test_data`] fixtures and [`InMemoryRepository`] provide
//!   canned data, optionally delayed on a scheduler
//!
//! # Example
//!
//! ```rust
//! use backflux_publisher::prelude::*;
//! use backflux_test_utils::{test_data::default_users, Verifier};
//!
//! # fn main() -> Result<(), backflux_test_utils::VerifyError> {
//! Verifier::create(from_iter(default_users()).map(|user| user.firstname))
//!     .expect_next(["Skyler", "Jesse", "Walter", "Saul"].map(String::from))
//!     .verify_complete()?;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod error_injection;
pub mod probe;
pub mod repository;
pub mod test_data;
pub mod test_subscriber;
pub mod user;
pub mod verifier;

pub use error_injection::{ErrorInjectingPublisher, TestError};
pub use probe::PublisherProbe;
pub use repository::{InMemoryRepository, ReactiveRepository};
pub use test_data::{default_users, jesse, marie, mike, saul, skyler, walter};
pub use test_subscriber::TestSubscriber;
pub use user::User;
pub use verifier::{Verifier, VerifyError};
