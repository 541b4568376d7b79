//! Audio, haptic, and LED cues fired at session transitions.
//!
//! Every cue is a fixed four-note melody followed by the motor double pulse.
//! Calls run to completion before returning; feedback never overlaps the
//! countdown.

use core::{fmt, time::Duration};

use crate::hal::{Indicators, Led, Motor, Speaker, TickSource};
use crate::session::Phase;
use crate::tick::dwell;

/// Note names understood by the speaker, middle C up to the C above (`H`).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Note {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
    H,
}

impl Note {
    /// Square-wave frequency in hertz.
    #[must_use]
    pub const fn frequency_hz(self) -> u32 {
        match self {
            Note::C => 262,
            Note::D => 293,
            Note::E => 330,
            Note::F => 349,
            Note::G => 392,
            Note::A => 440,
            Note::B => 494,
            Note::H => 523,
        }
    }

    /// Parses a note name. Only the eight names above are accepted.
    #[must_use]
    pub const fn from_name(name: char) -> Option<Self> {
        match name {
            'C' => Some(Note::C),
            'D' => Some(Note::D),
            'E' => Some(Note::E),
            'F' => Some(Note::F),
            'G' => Some(Note::G),
            'A' => Some(Note::A),
            'B' => Some(Note::B),
            'H' => Some(Note::H),
            _ => None,
        }
    }

    /// Single-letter name.
    #[must_use]
    pub const fn name(self) -> char {
        match self {
            Note::C => 'C',
            Note::D => 'D',
            Note::E => 'E',
            Note::F => 'F',
            Note::G => 'G',
            Note::A => 'A',
            Note::B => 'B',
            Note::H => 'H',
        }
    }
}

/// One note of a melody.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Tone {
    pub note: Note,
    pub duration: Duration,
}

impl Tone {
    pub const fn new(note: Note, millis: u64) -> Self {
        Self {
            note,
            duration: Duration::from_millis(millis),
        }
    }
}

/// Notes per cue melody.
pub const MELODY_LEN: usize = 4;

pub const INTRO_MELODY: [Tone; MELODY_LEN] = [
    Tone::new(Note::G, 700),
    Tone::new(Note::C, 350),
    Tone::new(Note::E, 350),
    Tone::new(Note::A, 1_200),
];

pub const STUDY_MELODY: [Tone; MELODY_LEN] = [
    Tone::new(Note::F, 350),
    Tone::new(Note::D, 350),
    Tone::new(Note::A, 350),
    Tone::new(Note::H, 500),
];

pub const BREAK_MELODY: [Tone; MELODY_LEN] = [
    Tone::new(Note::D, 350),
    Tone::new(Note::F, 350),
    Tone::new(Note::E, 350),
    Tone::new(Note::C, 500),
];

pub const CLOSING_MELODY: [Tone; MELODY_LEN] = [
    Tone::new(Note::A, 350),
    Tone::new(Note::G, 350),
    Tone::new(Note::B, 350),
    Tone::new(Note::H, 700),
];

/// One segment of the motor pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BuzzSegment {
    pub running: bool,
    pub duration: Duration,
}

impl BuzzSegment {
    const fn on(millis: u64) -> Self {
        Self {
            running: true,
            duration: Duration::from_millis(millis),
        }
    }

    const fn off(millis: u64) -> Self {
        Self {
            running: false,
            duration: Duration::from_millis(millis),
        }
    }
}

/// Short-gap-short double pulse played after every melody.
pub const BUZZ_PATTERN: [BuzzSegment; 3] = [
    BuzzSegment::on(200),
    BuzzSegment::off(140),
    BuzzSegment::on(200),
];

/// Total time the motor pattern takes.
#[must_use]
pub fn buzz_duration() -> Duration {
    BUZZ_PATTERN
        .iter()
        .fold(Duration::ZERO, |total, segment| total + segment.duration)
}

/// Transition points that carry feedback.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cue {
    Intro,
    Study,
    Break,
    Closing,
}

impl Cue {
    /// Melody played for the cue.
    #[must_use]
    pub const fn melody(self) -> &'static [Tone; MELODY_LEN] {
        match self {
            Cue::Intro => &INTRO_MELODY,
            Cue::Study => &STUDY_MELODY,
            Cue::Break => &BREAK_MELODY,
            Cue::Closing => &CLOSING_MELODY,
        }
    }

    /// Cue announcing the start of `phase`.
    #[must_use]
    pub const fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Study => Cue::Study,
            Phase::Break => Cue::Break,
        }
    }

    #[must_use]
    pub const fn as_index(self) -> u8 {
        match self {
            Cue::Intro => 0,
            Cue::Study => 1,
            Cue::Break => 2,
            Cue::Closing => 3,
        }
    }

    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Cue::Intro),
            1 => Some(Cue::Study),
            2 => Some(Cue::Break),
            3 => Some(Cue::Closing),
            _ => None,
        }
    }

    /// Total melody length, excluding the motor pattern.
    #[must_use]
    pub fn melody_duration(self) -> Duration {
        self.melody()
            .iter()
            .fold(Duration::ZERO, |total, tone| total + tone.duration)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Cue::Intro => "intro",
            Cue::Study => "study",
            Cue::Break => "break",
            Cue::Closing => "closing",
        };
        f.write_str(label)
    }
}

/// Plays a melody note by note.
pub async fn play_melody<S>(speaker: &mut S, melody: &[Tone])
where
    S: Speaker + ?Sized,
{
    for tone in melody {
        speaker.play_tone(tone.note, tone.duration).await;
    }
}

/// Plays the cue's melody, then buzzes the motor.
pub async fn play_cue<S, M>(speaker: &mut S, motor: &mut M, cue: Cue)
where
    S: Speaker + ?Sized,
    M: Motor + ?Sized,
{
    play_melody(speaker, cue.melody()).await;
    motor.buzz().await;
}

/// Which of the two LEDs is lit.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LedPattern {
    Off,
    Study,
    Break,
}

impl LedPattern {
    /// Pattern marking an active `phase`.
    #[must_use]
    pub const fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Study => LedPattern::Study,
            Phase::Break => LedPattern::Break,
        }
    }

    /// Returns whether `led` is lit under this pattern.
    #[must_use]
    pub const fn is_lit(self, led: Led) -> bool {
        matches!(
            (self, led),
            (LedPattern::Study, Led::Study) | (LedPattern::Break, Led::Break)
        )
    }
}

impl fmt::Display for LedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LedPattern::Off => "off",
            LedPattern::Study => "study",
            LedPattern::Break => "break",
        };
        f.write_str(label)
    }
}

/// Drives both LEDs to `pattern`.
pub fn show_pattern<L>(leds: &mut L, pattern: LedPattern)
where
    L: Indicators + ?Sized,
{
    leds.set(Led::Study, pattern.is_lit(Led::Study));
    leds.set(Led::Break, pattern.is_lit(Led::Break));
}

/// Alternates the LEDs once per tick after `ended` finishes.
///
/// Each alternation lights the other phase's LED for one tick and then the
/// ended phase's LED for one tick. The pair always settles on the break LED.
pub async fn blink_transition<L, T, F>(
    leds: &mut L,
    tick: &mut T,
    ended: Phase,
    alternations: u8,
    mut on_change: F,
) where
    L: Indicators + ?Sized,
    T: TickSource + ?Sized,
    F: FnMut(LedPattern),
{
    let away = LedPattern::for_phase(ended.next());
    let back = LedPattern::for_phase(ended);

    for _ in 0..alternations {
        show_pattern(leds, away);
        on_change(away);
        dwell(tick, 1).await;
        show_pattern(leds, back);
        on_change(back);
        dwell(tick, 1).await;
    }

    if back != LedPattern::Break {
        show_pattern(leds, LedPattern::Break);
        on_change(LedPattern::Break);
    }
}
