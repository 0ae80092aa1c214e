// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicUsize, Ordering};

/// Work-in-progress counter serializing an operator's emission loop.
///
/// Whoever moves the counter away from zero owns the loop; every other caller
/// (another thread, or a re-entrant call from inside the loop) only records
/// that more work is pending, and the owner runs the loop again before leaving.
#[derive(Debug, Default)]
pub struct WorkInProgress {
    wip: AtomicUsize,
}

impl WorkInProgress {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wip: AtomicUsize::new(0),
        }
    }

    /// Runs `work` until no caller has signalled missed work.
    pub fn drain(&self, mut work: impl FnMut()) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        let mut missed = 1;
        loop {
            work();
            let previous = self.wip.fetch_sub(missed, Ordering::AcqRel);
            missed = previous - missed;
            if missed == 0 {
                break;
            }
        }
    }

    /// Returns `true` while some thread is inside [`drain`](Self::drain).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.wip.load(Ordering::Acquire) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn reentrant_call_reruns_the_loop_instead_of_nesting() {
        let wip = WorkInProgress::new();
        let runs = Cell::new(0);
        let depth = Cell::new(0);

        wip.drain(|| {
            depth.set(depth.get() + 1);
            assert_eq!(depth.get(), 1);
            runs.set(runs.get() + 1);
            if runs.get() < 3 {
                wip.drain(|| unreachable!("nested drain must not run"));
            }
            depth.set(depth.get() - 1);
        });

        assert_eq!(runs.get(), 3);
        assert!(!wip.is_active());
    }
}
