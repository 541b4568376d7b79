//! Suspension points built on the one-shot tick latch.
//!
//! Timing only advances when the latch is polled. Every wait in the session
//! funnels through [`wait_for_second`], which yields to the executor between
//! polls so a test harness or emulator can feed synthetic time.

use embassy_futures::yield_now;

use crate::hal::TickSource;

/// Suspends until the tick source reports an elapsed second.
pub async fn wait_for_second<T>(tick: &mut T)
where
    T: TickSource + ?Sized,
{
    while !tick.second_elapsed() {
        yield_now().await;
    }
}

/// Suspends for `seconds` whole ticks.
///
/// This replaces wall-clock sleeps: a dwell is measured in observed latch
/// edges, so dropped ticks lengthen it rather than being double-counted.
pub async fn dwell<T>(tick: &mut T, seconds: u8)
where
    T: TickSource + ?Sized,
{
    for _ in 0..seconds {
        wait_for_second(tick).await;
    }
}

/// Software latch for targets without a hardware interrupt flag.
///
/// Producers call [`TickLatch::set`] whenever a second boundary is crossed;
/// the consumer clears it through [`TickSource::second_elapsed`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TickLatch {
    pending: bool,
}

impl TickLatch {
    /// Creates a cleared latch.
    pub const fn new() -> Self {
        Self { pending: false }
    }

    /// Marks a second boundary. Repeated calls before a read collapse.
    pub fn set(&mut self) {
        self.pending = true;
    }

    /// Returns `true` when a second boundary is waiting to be consumed.
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}

impl TickSource for TickLatch {
    fn second_elapsed(&mut self) -> bool {
        core::mem::take(&mut self.pending)
    }
}
