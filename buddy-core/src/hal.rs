//! Hardware abstraction shared by firmware, emulator, and test targets.
//!
//! Each trait stands in for one of the appliance peripherals. The session
//! machine only ever talks to these traits; the firmware crate binds them to
//! embassy-stm32 drivers while host targets provide terminal or scripted
//! implementations. Output services that take physical time to complete
//! (tones, motor pulses) are `async` so the caller suspends until they finish.

use core::time::Duration;

use crate::feedback::Note;

/// One-shot "a second has passed" latch fed by a periodic hardware signal.
pub trait TickSource {
    /// Returns `true` once per elapsed second and clears the latch.
    ///
    /// Seconds that pass without a call collapse into a single `true`.
    fn second_elapsed(&mut self) -> bool;
}

/// Single analog channel wired to the resistor-ladder button pad.
pub trait AnalogLine {
    /// Returns the latest conversion result as an unsigned magnitude.
    fn sample(&mut self) -> u16;
}

/// Direction of a relative cursor move.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CursorShift {
    Left,
    Right,
}

/// Character-cell display with a terminal-like cursor.
pub trait CharacterDisplay {
    /// Blanks every cell and homes the cursor.
    fn clear(&mut self);

    /// Homes the cursor without touching the contents.
    fn reset_cursor(&mut self);

    /// Jumps the cursor to the same column on the other row.
    fn advance_row(&mut self);

    /// Writes `c` at the cursor and advances one cell.
    fn print_char(&mut self, c: char);

    /// Moves the cursor `count` cells in `direction`.
    fn move_cursor(&mut self, direction: CursorShift, count: u8);

    /// Writes every character of `text` in order.
    fn print_str(&mut self, text: &str) {
        for c in text.chars() {
            self.print_char(c);
        }
    }

    /// Writes a single decimal digit. Values above 9 print their last digit.
    fn print_digit(&mut self, digit: u8) {
        self.print_char(char::from(b'0' + digit % 10));
    }
}

/// Piezo speaker able to hold a square-wave tone.
#[allow(async_fn_in_trait)]
pub trait Speaker {
    /// Plays `note` for `duration`, returning once the tone has finished.
    async fn play_tone(&mut self, note: Note, duration: Duration);
}

/// Vibration motor producing the fixed double-pulse pattern.
#[allow(async_fn_in_trait)]
pub trait Motor {
    /// Runs [`crate::feedback::BUZZ_PATTERN`] to completion.
    async fn buzz(&mut self);
}

/// Identifier for the two status LEDs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Led {
    /// LED 1, lit while a study phase is active.
    Study,
    /// LED 2, lit while a break phase is active.
    Break,
}

/// Two independent binary LED outputs.
pub trait Indicators {
    /// Lights or darkens `led`.
    fn set(&mut self, led: Led, lit: bool);
}

/// Speaker that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopSpeaker;

impl Speaker for NoopSpeaker {
    async fn play_tone(&mut self, _: Note, _: Duration) {}
}

/// Motor that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopMotor;

impl Motor for NoopMotor {
    async fn buzz(&mut self) {}
}

/// LED pair that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopIndicators;

impl Indicators for NoopIndicators {
    fn set(&mut self, _: Led, _: bool) {}
}

/// Every peripheral handle the session machine needs, owned in one place.
///
/// Handles are created once at start-up and live for the rest of the program;
/// nothing in the core reaches hardware through globals.
pub struct Board<T, A, D, S, M, L> {
    pub tick: T,
    pub line: A,
    pub display: D,
    pub speaker: S,
    pub motor: M,
    pub leds: L,
}

impl<T, A, D, S, M, L> Board<T, A, D, S, M, L>
where
    T: TickSource,
    A: AnalogLine,
    D: CharacterDisplay,
    S: Speaker,
    M: Motor,
    L: Indicators,
{
    /// Bundles the peripheral handles.
    pub const fn new(tick: T, line: A, display: D, speaker: S, motor: M, leds: L) -> Self {
        Self {
            tick,
            line,
            display,
            speaker,
            motor,
            leds,
        }
    }
}
