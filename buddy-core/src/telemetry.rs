//! Session event catalog shared by firmware and host targets.
//!
//! The core never logs directly. Instead the session machine reports every
//! state change, accepted button, cue, countdown edge, and LED change as a
//! [`SessionEvent`] to a [`TelemetrySink`]. The firmware mirrors events to
//! `defmt`, the emulator writes them to a transcript, and tests collect them in
//! a [`TelemetryRecorder`] to assert on the session's shape.

use core::fmt;

use heapless::{HistoryBuf, OldestOrdered};

use crate::feedback::{Cue, LedPattern};
use crate::input::LogicalInput;
use crate::session::{Phase, SessionConfig, SessionState};

/// Discriminated session events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    StateEntered(SessionState),
    ButtonPressed(LogicalInput),
    ConfigCommitted(SessionConfig),
    CueStarted(Cue),
    CountdownStarted {
        phase: Phase,
        rotation: u8,
        total_seconds: u32,
    },
    CountdownTick {
        remaining: u32,
    },
    CountdownFinished {
        phase: Phase,
        rotation: u8,
        decrements: u32,
    },
    LedsChanged(LedPattern),
}

impl SessionEvent {
    const STATE_ENTERED_BASE: u16 = 0x0000;
    const BUTTON_PRESSED_BASE: u16 = 0x0010;
    const CUE_STARTED_BASE: u16 = 0x0020;
    const CONFIG_COMMITTED_CODE: u16 = 0x0030;
    const COUNTDOWN_STARTED_BASE: u16 = 0x0040;
    const COUNTDOWN_TICK_CODE: u16 = 0x0050;
    const COUNTDOWN_FINISHED_BASE: u16 = 0x0060;
    const LEDS_CHANGED_BASE: u16 = 0x0070;

    /// Encodes the event kind into a compact transport-friendly discriminant.
    ///
    /// Payload values (minutes, rotations, remaining seconds) are not part of
    /// the code.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            SessionEvent::StateEntered(state) => Self::STATE_ENTERED_BASE + state.as_index() as u16,
            SessionEvent::ButtonPressed(input) => {
                Self::BUTTON_PRESSED_BASE + input.as_index() as u16
            }
            SessionEvent::ConfigCommitted(_) => Self::CONFIG_COMMITTED_CODE,
            SessionEvent::CueStarted(cue) => Self::CUE_STARTED_BASE + cue.as_index() as u16,
            SessionEvent::CountdownStarted { phase, .. } => {
                Self::COUNTDOWN_STARTED_BASE + phase.as_index() as u16
            }
            SessionEvent::CountdownTick { .. } => Self::COUNTDOWN_TICK_CODE,
            SessionEvent::CountdownFinished { phase, .. } => {
                Self::COUNTDOWN_FINISHED_BASE + phase.as_index() as u16
            }
            SessionEvent::LedsChanged(pattern) => {
                Self::LEDS_CHANGED_BASE + led_pattern_index(pattern)
            }
        }
    }

    /// Returns `true` for the once-per-second events that swamp a log.
    #[must_use]
    pub const fn is_periodic(self) -> bool {
        matches!(self, SessionEvent::CountdownTick { .. })
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::StateEntered(state) => write!(f, "state {state}"),
            SessionEvent::ButtonPressed(input) => write!(f, "button {input}"),
            SessionEvent::ConfigCommitted(config) => write!(f, "config {config}"),
            SessionEvent::CueStarted(cue) => write!(f, "cue {cue}"),
            SessionEvent::CountdownStarted {
                phase,
                rotation,
                total_seconds,
            } => write!(
                f,
                "countdown-started {phase} rotation={rotation} seconds={total_seconds}"
            ),
            SessionEvent::CountdownTick { remaining } => {
                write!(f, "countdown-tick remaining={remaining}")
            }
            SessionEvent::CountdownFinished {
                phase,
                rotation,
                decrements,
            } => write!(
                f,
                "countdown-finished {phase} rotation={rotation} decrements={decrements}"
            ),
            SessionEvent::LedsChanged(pattern) => write!(f, "leds {pattern}"),
        }
    }
}

const fn led_pattern_index(pattern: LedPattern) -> u16 {
    match pattern {
        LedPattern::Off => 0,
        LedPattern::Study => 1,
        LedPattern::Break => 2,
    }
}

/// Destination for session events.
pub trait TelemetrySink {
    fn record(&mut self, event: SessionEvent);
}

impl<K> TelemetrySink for &mut K
where
    K: TelemetrySink + ?Sized,
{
    fn record(&mut self, event: SessionEvent) {
        (**self).record(event);
    }
}

/// Sink that discards every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record(&mut self, _: SessionEvent) {}
}

/// Total number of session events retained in memory by default.
pub const TELEMETRY_RING_CAPACITY: usize = 64;

/// Records session events into a fixed-size ring buffer.
pub struct TelemetryRecorder<const CAPACITY: usize = TELEMETRY_RING_CAPACITY> {
    ring: HistoryBuf<SessionEvent, CAPACITY>,
    recorded: u32,
}

impl<const CAPACITY: usize> TelemetryRecorder<CAPACITY> {
    /// Creates a recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            recorded: 0,
        }
    }

    /// Returns the retained events in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, SessionEvent> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent event, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&SessionEvent> {
        self.ring.recent()
    }

    /// Number of events currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of events ever recorded, including ones the ring has dropped.
    #[must_use]
    pub const fn recorded(&self) -> u32 {
        self.recorded
    }
}

impl<const CAPACITY: usize> Default for TelemetryRecorder<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAPACITY: usize> TelemetrySink for TelemetryRecorder<CAPACITY> {
    fn record(&mut self, event: SessionEvent) {
        self.recorded = self.recorded.wrapping_add(1);
        self.ring.write(event);
    }
}
