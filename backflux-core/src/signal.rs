// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::BackfluxError;

/// One signal travelling from a publisher to a subscriber.
///
/// At most one terminal signal (`Error` or `Complete`) is delivered per
/// subscription and no `Next` follows it.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal<T> {
    /// An item
    Next(T),
    /// A failure that terminates the sequence
    Error(BackfluxError),
    /// Successful end of the sequence
    Complete,
}

impl<T> Signal<T> {
    /// Returns `true` if this is an `Error` or `Complete`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Signal::Error(_) | Signal::Complete)
    }

    /// Returns `true` if this is a `Next`.
    pub const fn is_next(&self) -> bool {
        matches!(self, Signal::Next(_))
    }

    /// Returns `true` if this is an `Error`.
    pub const fn is_error(&self) -> bool {
        matches!(self, Signal::Error(_))
    }

    /// Converts from `Signal<T>` to `Option<T>`, discarding terminal signals.
    pub fn next(self) -> Option<T> {
        match self {
            Signal::Next(v) => Some(v),
            _ => None,
        }
    }

    /// Converts from `Signal<T>` to `Option<BackfluxError>`.
    pub fn err(self) -> Option<BackfluxError> {
        match self {
            Signal::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the item of a `Next` signal. Terminal signals pass unchanged.
    pub fn map<U, F>(self, f: F) -> Signal<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Signal::Next(v) => Signal::Next(f(v)),
            Signal::Error(e) => Signal::Error(e),
            Signal::Complete => Signal::Complete,
        }
    }

    /// Short name used in log lines.
    pub const fn kind(&self) -> &'static str {
        match self {
            Signal::Next(_) => "next",
            Signal::Error(_) => "error",
            Signal::Complete => "complete",
        }
    }
}

impl<T> From<Result<T, BackfluxError>> for Signal<T> {
    fn from(result: Result<T, BackfluxError>) -> Self {
        match result {
            Ok(v) => Signal::Next(v),
            Err(e) => Signal::Error(e),
        }
    }
}
