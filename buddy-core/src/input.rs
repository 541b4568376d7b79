//! Resistor-ladder button classification and edge-triggered reads.
//!
//! All five buttons share one analog line; each press pulls the line into a
//! distinct voltage band. [`ButtonLadder`] maps a raw 12-bit conversion to a
//! [`LogicalInput`], and [`ButtonLadder::user_input`] turns the level signal
//! into exactly one event per physical press/release cycle.

use core::fmt;

use embassy_futures::yield_now;

use crate::hal::AnalogLine;

/// Debounced, classified button event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogicalInput {
    None,
    Select,
    Up,
    Down,
    Left,
    Right,
}

impl LogicalInput {
    /// Short lowercase label used in logs and transcripts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            LogicalInput::None => "none",
            LogicalInput::Select => "select",
            LogicalInput::Up => "up",
            LogicalInput::Down => "down",
            LogicalInput::Left => "left",
            LogicalInput::Right => "right",
        }
    }

    /// Deterministic index, used for compact telemetry codes.
    #[must_use]
    pub const fn as_index(self) -> u8 {
        match self {
            LogicalInput::None => 0,
            LogicalInput::Select => 1,
            LogicalInput::Down => 2,
            LogicalInput::Right => 3,
            LogicalInput::Up => 4,
            LogicalInput::Left => 5,
        }
    }

    /// Inverse of [`LogicalInput::as_index`].
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(LogicalInput::None),
            1 => Some(LogicalInput::Select),
            2 => Some(LogicalInput::Down),
            3 => Some(LogicalInput::Right),
            4 => Some(LogicalInput::Up),
            5 => Some(LogicalInput::Left),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Highest reading produced by the 12-bit converter.
pub const ADC_FULL_SCALE: u16 = 0x0FFF;

/// Raw reading range that identifies one button.
///
/// Both bounds are exclusive. A band without an upper bound extends to the top
/// of the converter range.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ButtonBand {
    pub input: LogicalInput,
    pub above: u16,
    pub below: Option<u16>,
}

impl ButtonBand {
    /// Band covering readings strictly between `above` and `below`.
    #[must_use]
    pub const fn between(input: LogicalInput, above: u16, below: u16) -> Self {
        Self {
            input,
            above,
            below: Some(below),
        }
    }

    /// Band covering every reading strictly greater than `above`.
    #[must_use]
    pub const fn above(input: LogicalInput, above: u16) -> Self {
        Self {
            input,
            above,
            below: None,
        }
    }

    /// Returns `true` when `raw` falls inside the band.
    #[must_use]
    pub const fn contains(&self, raw: u16) -> bool {
        if raw <= self.above {
            return false;
        }
        match self.below {
            Some(below) => raw < below,
            None => true,
        }
    }

    /// Smallest reading inside the band.
    #[must_use]
    pub const fn first(&self) -> u16 {
        self.above.saturating_add(1)
    }

    /// Largest converter reading inside the band.
    #[must_use]
    pub const fn last(&self) -> u16 {
        match self.below {
            Some(below) => below.saturating_sub(1),
            None => ADC_FULL_SCALE,
        }
    }

    /// Reading in the middle of the band, handy for simulated presses.
    ///
    /// An empty band yields its lower edge.
    #[must_use]
    pub const fn midpoint(&self) -> u16 {
        let first = self.first();
        first + self.last().saturating_sub(first) / 2
    }

    const fn is_empty(&self) -> bool {
        match self.below {
            Some(below) => below <= self.above.saturating_add(1),
            None => self.above >= ADC_FULL_SCALE,
        }
    }

    const fn overlaps(&self, other: &ButtonBand) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }
}

/// Number of buttons on the ladder.
pub const BUTTON_COUNT: usize = 5;

/// Readings at or below this level mean no button is held.
pub const DEFAULT_NOISE_FLOOR: u16 = 0x030;

/// Band layout of the first board revision, in classifier order.
pub const DEFAULT_BANDS: [ButtonBand; BUTTON_COUNT] = [
    ButtonBand::above(LogicalInput::Select, 0xE66),
    ButtonBand::between(LogicalInput::Down, 0x8F5, 0xA8F),
    ButtonBand::between(LogicalInput::Right, 0x385, 0x4CC),
    ButtonBand::between(LogicalInput::Up, 0x51E, 0x75C),
    ButtonBand::between(LogicalInput::Left, 0x199, 0x333),
];

/// Reasons a band table is rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LadderError {
    /// A band contains no readings at all.
    EmptyBand(LogicalInput),
    /// A band reaches down into the idle noise floor.
    BelowNoiseFloor(LogicalInput),
    /// Two bands share at least one reading.
    Overlap(LogicalInput, LogicalInput),
    /// The same input is mapped by more than one band.
    Duplicate(LogicalInput),
    /// `LogicalInput::None` cannot be bound to a band.
    UnmappedInput,
}

impl fmt::Display for LadderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LadderError::EmptyBand(input) => write!(f, "band for {input} is empty"),
            LadderError::BelowNoiseFloor(input) => {
                write!(f, "band for {input} starts inside the noise floor")
            }
            LadderError::Overlap(a, b) => write!(f, "bands for {a} and {b} overlap"),
            LadderError::Duplicate(input) => write!(f, "{input} is mapped more than once"),
            LadderError::UnmappedInput => f.write_str("`none` cannot own a band"),
        }
    }
}

/// Noise floor plus the ordered band table for one button pad.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ButtonLadder {
    noise_floor: u16,
    bands: [ButtonBand; BUTTON_COUNT],
}

impl ButtonLadder {
    /// Layout measured on the first board revision (12-bit, VDD reference).
    pub const DEFAULT: Self = Self {
        noise_floor: DEFAULT_NOISE_FLOOR,
        bands: DEFAULT_BANDS,
    };

    /// Builds a validated ladder.
    ///
    /// # Errors
    ///
    /// Returns the first [`LadderError`] found by [`ButtonLadder::validate`].
    pub fn new(noise_floor: u16, bands: [ButtonBand; BUTTON_COUNT]) -> Result<Self, LadderError> {
        let ladder = Self { noise_floor, bands };
        ladder.validate()?;
        Ok(ladder)
    }

    /// Returns the idle threshold.
    #[must_use]
    pub const fn noise_floor(&self) -> u16 {
        self.noise_floor
    }

    /// Returns the bands in classifier order.
    #[must_use]
    pub const fn bands(&self) -> &[ButtonBand; BUTTON_COUNT] {
        &self.bands
    }

    /// Returns the band bound to `input`, if any.
    #[must_use]
    pub fn band_for(&self, input: LogicalInput) -> Option<&ButtonBand> {
        self.bands.iter().find(|band| band.input == input)
    }

    /// Checks that every band is non-empty, above the floor, and disjoint.
    ///
    /// # Errors
    ///
    /// Returns a [`LadderError`] naming the first offending band.
    pub fn validate(&self) -> Result<(), LadderError> {
        for (index, band) in self.bands.iter().enumerate() {
            if band.input == LogicalInput::None {
                return Err(LadderError::UnmappedInput);
            }
            if band.is_empty() {
                return Err(LadderError::EmptyBand(band.input));
            }
            if band.first() <= self.noise_floor {
                return Err(LadderError::BelowNoiseFloor(band.input));
            }
            for other in &self.bands[index + 1..] {
                if other.input == band.input {
                    return Err(LadderError::Duplicate(band.input));
                }
                if band.overlaps(other) {
                    return Err(LadderError::Overlap(band.input, other.input));
                }
            }
        }
        Ok(())
    }

    /// Returns `true` when `raw` indicates a held button.
    #[must_use]
    pub const fn is_pressed(&self, raw: u16) -> bool {
        raw > self.noise_floor
    }

    /// Maps one raw reading to a logical input; the first matching band wins.
    #[must_use]
    pub fn classify(&self, raw: u16) -> LogicalInput {
        if !self.is_pressed(raw) {
            return LogicalInput::None;
        }
        self.bands
            .iter()
            .find(|band| band.contains(raw))
            .map_or(LogicalInput::None, |band| band.input)
    }

    /// Samples the line once and classifies the reading (level poll).
    pub fn poll_input<A>(&self, line: &mut A) -> LogicalInput
    where
        A: AnalogLine + ?Sized,
    {
        self.classify(line.sample())
    }

    /// Blocks for one complete press/release cycle and returns its input.
    ///
    /// The first reading above the noise floor is classified; the call then
    /// waits for the line to drop back below the floor before returning. A
    /// press that lands between bands yields [`LogicalInput::None`].
    pub async fn user_input<A>(&self, line: &mut A) -> LogicalInput
    where
        A: AnalogLine + ?Sized,
    {
        let pressed = loop {
            let raw = line.sample();
            if self.is_pressed(raw) {
                break raw;
            }
            yield_now().await;
        };

        let input = self.classify(pressed);

        while line.sample() >= self.noise_floor {
            yield_now().await;
        }

        input
    }
}

impl Default for ButtonLadder {
    fn default() -> Self {
        Self::DEFAULT
    }
}
