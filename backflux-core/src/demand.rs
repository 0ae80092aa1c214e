// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Saturating demand arithmetic.

use crate::error::{BackfluxError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Demand value meaning "no limit". It is never decremented.
pub const UNBOUNDED: u64 = u64::MAX;

/// Rejects a non-positive request.
///
/// # Errors
/// Returns [`BackfluxError::InvalidDemand`] when `n` is zero.
pub fn validate_demand(n: u64) -> Result<u64> {
    if n == 0 {
        Err(BackfluxError::invalid_demand(n))
    } else {
        Ok(n)
    }
}

/// Adds two demand values, capping at [`UNBOUNDED`].
#[must_use]
pub const fn saturating_add(current: u64, n: u64) -> u64 {
    current.saturating_add(n)
}

/// Outstanding demand of one subscription.
#[derive(Debug, Default)]
pub struct Demand {
    requested: AtomicU64,
}

impl Demand {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requested: AtomicU64::new(0),
        }
    }

    /// Adds `n` and returns the demand that was outstanding before.
    pub fn add(&self, n: u64) -> u64 {
        let mut current = self.requested.load(Ordering::Acquire);
        loop {
            let next = saturating_add(current, n);
            match self.requested.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => return previous,
                Err(actual) => current = actual,
            }
        }
    }

    /// Consumes one unit of demand if any is outstanding.
    pub fn try_take(&self) -> bool {
        let mut current = self.requested.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return false;
            }
            if current == UNBOUNDED {
                return true;
            }
            match self.requested.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Current outstanding demand.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.requested.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.current() == UNBOUNDED
    }
}
