//! Per-second countdown for one study or break phase.
//!
//! The phase length is converted to seconds up front; every confirmed tick
//! removes exactly one second and redraws `MM:SS` at a fixed cell on the top
//! row. The only suspension point is the tick wait, and nothing can interrupt
//! a running countdown.

use crate::hal::{CharacterDisplay, CursorShift, TickSource};
use crate::tick::wait_for_second;

/// Column on the top row where `MM:SS` is drawn.
pub const COUNTDOWN_COLUMN: u8 = 11;

/// Label drawn on the bottom row ahead of the rotation digit.
pub const ROTATIONS_LEFT_LABEL: &str = "Rotations Left:";

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Remaining time of the phase in progress.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CountdownState {
    remaining_seconds: u32,
    rotations_remaining: u8,
}

impl CountdownState {
    /// Starts a countdown of `minutes` for the rotation labelled `rotations_remaining`.
    #[must_use]
    pub const fn from_minutes(minutes: u8, rotations_remaining: u8) -> Self {
        Self {
            remaining_seconds: minutes as u32 * SECONDS_PER_MINUTE,
            rotations_remaining,
        }
    }

    #[must_use]
    pub const fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub const fn rotations_remaining(&self) -> u8 {
        self.rotations_remaining
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// Removes one second. Returns `false` once nothing was left to remove.
    pub fn tick(&mut self) -> bool {
        if self.remaining_seconds == 0 {
            return false;
        }
        self.remaining_seconds -= 1;
        true
    }

    /// Splits the remaining time into `(minutes, seconds)`.
    #[must_use]
    pub const fn split(&self) -> (u32, u32) {
        (
            self.remaining_seconds / SECONDS_PER_MINUTE,
            self.remaining_seconds % SECONDS_PER_MINUTE,
        )
    }

    /// Returns the four display digits `[M, M, S, S]`.
    ///
    /// Minutes above 99 cannot be configured; only the last two digits show.
    #[must_use]
    pub fn digits(&self) -> [u8; 4] {
        let (minutes, seconds) = self.split();
        [
            decimal_digit(minutes / 10),
            decimal_digit(minutes),
            decimal_digit(seconds / 10),
            decimal_digit(seconds),
        ]
    }
}

fn decimal_digit(value: u32) -> u8 {
    // `value % 10` always fits.
    u8::try_from(value % 10).unwrap_or(0)
}

/// Draws the bottom-row rotation label.
pub fn render_rotation_label<D>(display: &mut D, rotations_remaining: u8)
where
    D: CharacterDisplay + ?Sized,
{
    display.reset_cursor();
    display.advance_row();
    display.print_str(ROTATIONS_LEFT_LABEL);
    display.print_digit(rotations_remaining);
}

/// Draws `MM:SS` at [`COUNTDOWN_COLUMN`].
pub fn render_remaining<D>(display: &mut D, state: &CountdownState)
where
    D: CharacterDisplay + ?Sized,
{
    let [m1, m2, s1, s2] = state.digits();
    display.reset_cursor();
    display.move_cursor(CursorShift::Right, COUNTDOWN_COLUMN);
    display.print_digit(m1);
    display.print_digit(m2);
    display.print_char(':');
    display.print_digit(s1);
    display.print_digit(s2);
}

/// Counts `minutes` down to zero, one tick per second.
///
/// `on_tick` observes the state after every decrement. Returns the number of
/// decrements performed, which is always `minutes * 60`.
pub async fn run_countdown<T, D, F>(
    tick: &mut T,
    display: &mut D,
    minutes: u8,
    rotation_label: u8,
    mut on_tick: F,
) -> u32
where
    T: TickSource + ?Sized,
    D: CharacterDisplay + ?Sized,
    F: FnMut(&CountdownState),
{
    let mut state = CountdownState::from_minutes(minutes, rotation_label);
    let mut decrements = 0;

    render_rotation_label(display, state.rotations_remaining());

    while !state.is_finished() {
        wait_for_second(tick).await;
        if state.tick() {
            decrements += 1;
        }
        render_remaining(display, &state);
        on_tick(&state);
    }

    decrements
}
