#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use buddy_core::display::CharacterGrid;
use buddy_core::feedback::{Cue, Note};
use buddy_core::hal::{
    AnalogLine, Board, CharacterDisplay, CursorShift, Indicators, Led, Motor, Speaker, TickSource,
};
use buddy_core::input::{ButtonLadder, LogicalInput};
use buddy_core::session::StudySession;
use buddy_core::telemetry::{SessionEvent, TelemetrySink};

/// ADC samples replayed in order. Running dry means the session asked for
/// more input than the test scripted.
pub struct ScriptedLine {
    samples: VecDeque<u16>,
}

impl ScriptedLine {
    /// Scripts one press/release cycle per input, pressing at the band midpoint.
    pub fn pressing(inputs: &[LogicalInput]) -> Self {
        let ladder = ButtonLadder::DEFAULT;
        let mut samples = VecDeque::new();
        for input in inputs {
            let band = ladder
                .band_for(*input)
                .unwrap_or_else(|| panic!("no band for {input}"));
            samples.push_back(band.midpoint());
            samples.push_back(0);
        }
        Self { samples }
    }

    /// Scripts raw readings verbatim.
    pub fn raw(samples: &[u16]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl AnalogLine for ScriptedLine {
    fn sample(&mut self) -> u16 {
        self.samples.pop_front().expect("input script exhausted")
    }
}

/// Tick source whose latch is set on every poll.
#[derive(Default)]
pub struct InstantTick {
    pub ticks: u32,
}

impl TickSource for InstantTick {
    fn second_elapsed(&mut self) -> bool {
        self.ticks += 1;
        true
    }
}

/// Character grid that snapshots every non-blank screen it is asked to clear.
#[derive(Default)]
pub struct SnapshotGrid {
    pub grid: CharacterGrid,
    pub screens: Vec<[String; 2]>,
}

impl SnapshotGrid {
    pub fn current(&self) -> [String; 2] {
        [
            self.grid.visible_text(0).to_owned(),
            self.grid.visible_text(1).to_owned(),
        ]
    }
}

impl CharacterDisplay for SnapshotGrid {
    fn clear(&mut self) {
        let screen = self.current();
        if !(screen[0].is_empty() && screen[1].is_empty()) {
            self.screens.push(screen);
        }
        self.grid.clear();
    }

    fn reset_cursor(&mut self) {
        self.grid.reset_cursor();
    }

    fn advance_row(&mut self) {
        self.grid.advance_row();
    }

    fn print_char(&mut self, c: char) {
        self.grid.print_char(c);
    }

    fn move_cursor(&mut self, direction: CursorShift, count: u8) {
        self.grid.move_cursor(direction, count);
    }
}

#[derive(Default)]
pub struct RecordingSpeaker {
    pub tones: Vec<(Note, Duration)>,
}

impl Speaker for RecordingSpeaker {
    async fn play_tone(&mut self, note: Note, duration: Duration) {
        self.tones.push((note, duration));
    }
}

#[derive(Default)]
pub struct CountingMotor {
    pub buzzes: u32,
}

impl Motor for CountingMotor {
    async fn buzz(&mut self) {
        self.buzzes += 1;
    }
}

#[derive(Default)]
pub struct LedLog {
    pub study: bool,
    pub brk: bool,
}

impl Indicators for LedLog {
    fn set(&mut self, led: Led, lit: bool) {
        match led {
            Led::Study => self.study = lit,
            Led::Break => self.brk = lit,
        }
    }
}

/// Unbounded event sink; a full session emits one event per countdown second.
#[derive(Default)]
pub struct EventLog {
    pub events: Vec<SessionEvent>,
}

impl TelemetrySink for EventLog {
    fn record(&mut self, event: SessionEvent) {
        self.events.push(event);
    }
}

/// Coarse session outline used to compare whole runs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Milestone {
    Cue(Cue),
    Countdown(u32),
}

impl EventLog {
    pub fn milestones(&self) -> Vec<Milestone> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::CueStarted(cue) => Some(Milestone::Cue(*cue)),
                SessionEvent::CountdownFinished { decrements, .. } => {
                    Some(Milestone::Countdown(*decrements))
                }
                _ => None,
            })
            .collect()
    }
}

pub type TestBoard =
    Board<InstantTick, ScriptedLine, SnapshotGrid, RecordingSpeaker, CountingMotor, LedLog>;

pub type TestSession = StudySession<
    InstantTick,
    ScriptedLine,
    SnapshotGrid,
    RecordingSpeaker,
    CountingMotor,
    LedLog,
    EventLog,
>;

pub fn session(inputs: &[LogicalInput]) -> TestSession {
    session_with_line(ScriptedLine::pressing(inputs))
}

pub fn session_with_line(line: ScriptedLine) -> TestSession {
    let board = Board::new(
        InstantTick::default(),
        line,
        SnapshotGrid::default(),
        RecordingSpeaker::default(),
        CountingMotor::default(),
        LedLog::default(),
    );
    StudySession::new(board, EventLog::default())
}

/// Presses that leave the welcome screen and step every editor from its
/// default to the given values.
pub fn configure(study: u8, rest: u8, rotations: u8) -> Vec<LogicalInput> {
    let mut inputs = vec![LogicalInput::Select];
    inputs.extend(edit_two_digits(study));
    inputs.extend(edit_two_digits(rest));
    inputs.extend(step_towards(1, rotations));
    inputs.push(LogicalInput::Select);
    inputs
}

fn edit_two_digits(value: u8) -> Vec<LogicalInput> {
    let mut inputs = step_towards(5, value / 10);
    inputs.push(LogicalInput::Right);
    inputs.extend(step_towards(5, value % 10));
    inputs.push(LogicalInput::Select);
    inputs
}

fn step_towards(from: u8, to: u8) -> Vec<LogicalInput> {
    if to >= from {
        vec![LogicalInput::Up; usize::from(to - from)]
    } else {
        vec![LogicalInput::Down; usize::from(from - to)]
    }
}
