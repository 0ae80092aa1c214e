// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the Backflux reactive streams engine
//!
//! Every failure that can cross a publisher/subscriber boundary is a
//! [`BackfluxError`]. Errors are delivered downstream as the terminal
//! [`Signal::Error`](crate::Signal::Error) or returned directly from protocol
//! calls such as [`Subscription::request`](crate::Subscription::request).
//!
//! # Examples
//!
//! ```
//! use backflux_core::{BackfluxError, Result};
//!
//! fn validate(n: u64) -> Result<u64> {
//!     if n == 0 {
//!         return Err(BackfluxError::invalid_demand(n));
//!     }
//!     Ok(n)
//! }
//!
//! assert!(validate(0).is_err());
//! ```

use std::error::Error as StdError;
use std::sync::Arc;

/// Root error type for all Backflux operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackfluxError {
    /// A subscriber requested a non-positive amount of items.
    #[error("Invalid demand: request({requested}) must be positive")]
    InvalidDemand {
        /// The rejected request amount
        requested: u64,
    },

    /// The reactive streams protocol was violated.
    ///
    /// Raised on double subscription of a single-use publisher, on signals
    /// observed after a terminal signal, and by `error(..)` sources built from
    /// an illegal-state cause.
    #[error("Illegal state: {context}")]
    IllegalState {
        /// Description of the violated rule
        context: String,
    },

    /// Failure surfaced by an upstream producer or by a user-supplied
    /// combining or mapping function.
    #[error("Upstream error: {0}")]
    Upstream(#[source] Arc<dyn StdError + Send + Sync>),

    /// A time-based source produced an item while its subscriber had no
    /// outstanding demand.
    #[error("Overflow: {context}")]
    Overflow {
        /// What could not be emitted
        context: String,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

impl BackfluxError {
    /// Create an invalid demand error for the given request amount
    #[must_use]
    pub const fn invalid_demand(requested: u64) -> Self {
        Self::InvalidDemand { requested }
    }

    /// Create an illegal state error with the given context
    pub fn illegal_state(context: impl Into<String>) -> Self {
        Self::IllegalState {
            context: context.into(),
        }
    }

    /// Create an overflow error with the given context
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::Overflow {
            context: context.into(),
        }
    }

    /// Wrap a user or producer error
    pub fn upstream(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::Upstream(Arc::new(error))
    }

    /// Create an upstream error from a plain message
    pub fn upstream_message(message: impl Into<String>) -> Self {
        Self::upstream(Message(message.into()))
    }

    /// Returns `true` for errors raised by the engine itself rather than by
    /// a producer or user function.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::InvalidDemand { .. } | Self::IllegalState { .. })
    }
}

impl PartialEq for BackfluxError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidDemand { requested: a }, Self::InvalidDemand { requested: b }) => a == b,
            (Self::IllegalState { context: a }, Self::IllegalState { context: b }) => a == b,
            (Self::Overflow { context: a }, Self::Overflow { context: b }) => a == b,
            (Self::Upstream(a), Self::Upstream(b)) => {
                Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}

/// Specialized Result type for Backflux operations
pub type Result<T> = std::result::Result<T, BackfluxError>;

/// Extension trait for converting foreign errors into [`BackfluxError::Upstream`]
pub trait IntoBackfluxError {
    /// Convert this error into an upstream `BackfluxError`
    fn into_backflux(self) -> BackfluxError;
}

impl<E: StdError + Send + Sync + 'static> IntoBackfluxError for E {
    fn into_backflux(self) -> BackfluxError {
        BackfluxError::upstream(self)
    }
}

/// Helper trait for lifting fallible user results into Backflux results
pub trait ResultExt<T> {
    /// Map the error side into [`BackfluxError::Upstream`]
    ///
    /// # Errors
    /// Returns `Err(BackfluxError::Upstream)` if the underlying result is `Err`.
    fn upstream(self) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn upstream(self) -> Result<T> {
        self.map_err(BackfluxError::upstream)
    }
}
