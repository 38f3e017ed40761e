// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot initialization guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// A one-shot initialization flag flipped with compare-and-swap.
///
/// Exactly one caller of [`InitState::try_begin`] observes `true`, no matter
/// how many threads race on first use. No lock is held while the winner does
/// its work.
///
/// # Examples
///
/// ```
/// use overlaycfg::domain::InitState;
///
/// let state = InitState::new();
/// assert!(state.try_begin());
/// assert!(!state.try_begin());
/// assert!(state.is_initialized());
/// ```
#[derive(Debug, Default)]
pub struct InitState {
    initialized: AtomicBool,
}

impl InitState {
    /// Creates an uninitialized guard.
    pub const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
        }
    }

    /// Claims initialization. Returns `true` only for the first caller.
    pub fn try_begin(&self) -> bool {
        self.initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether initialization has been claimed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Returns the guard to its uninitialized state.
    ///
    /// Not part of normal operation; the owner must also undo whatever the
    /// guarded work did before initializing again.
    pub fn reset(&self) {
        self.initialized.store(false, Ordering::Release);
    }
}
