#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! One-second latch shared between the ticker task and the session task.
//!
//! The ticker task sets the flag once per second; the session clears it
//! through [`LatchedTick`]. Seconds that elapse while nobody polls collapse
//! into a single pending tick, matching a hardware interrupt flag.

use buddy_core::hal::TickSource;
use portable_atomic::{AtomicBool, Ordering};

static SECOND_LATCH: AtomicBool = AtomicBool::new(false);

/// Marks a second boundary.
pub fn mark_second() {
    SECOND_LATCH.store(true, Ordering::Release);
}

/// Session-side view of the latch.
pub struct LatchedTick {
    _private: (),
}

impl LatchedTick {
    /// Creates the consumer handle. Any tick already pending is discarded.
    pub fn new() -> Self {
        SECOND_LATCH.store(false, Ordering::Release);
        Self { _private: () }
    }
}

impl Default for LatchedTick {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for LatchedTick {
    fn second_elapsed(&mut self) -> bool {
        SECOND_LATCH.swap(false, Ordering::AcqRel)
    }
}
