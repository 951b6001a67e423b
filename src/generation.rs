//! Sweep generation counter.
//!
//! The counter is even while idle and odd while a sweep runs: every sweep is
//! bracketed by two increments. Values wrap; only the cyclic distance between
//! two observations carries meaning.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cyclic "`a` is at or after `b`" on a wrapping counter.
///
/// `a` counts as at or after `b` when moving forward from `b` reaches `a` in
/// at most half the counter space. Native `>=` would give the wrong answer
/// as soon as the counter wraps between the two observations.
#[inline]
pub const fn seq_at_least(a: u64, b: u64) -> bool {
    a.wrapping_sub(b) <= u64::MAX / 2
}

/// Counter value a caller that observed `snap` must see before it may return.
///
/// From an even (idle) snapshot one full sweep suffices: two increments.
/// From an odd snapshot the running sweep may have started before the
/// caller's writes, so it must finish and one more sweep must run: three
/// increments. Both cases are `(snap + 3)` rounded down to even.
#[inline]
pub const fn sweep_target(snap: u64) -> u64 {
    snap.wrapping_add(3) & !1
}

/// Returns `true` while a sweep is running.
#[inline]
pub const fn in_progress(seq: u64) -> bool {
    seq & 1 == 1
}

/// Atomic generation counter. Mutated only under the sweep lock.
#[derive(Debug, Default)]
pub(crate) struct Generation(AtomicU64);

impl Generation {
    #[cfg(test)]
    pub(crate) fn starting_at(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }

    pub(crate) fn load(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Increment and return the new value.
    pub(crate) fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }
}
