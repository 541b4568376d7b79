use std::collections::VecDeque;
use std::io;
use std::path::Path;

#[allow(dead_code)]
#[path = "../transcript.rs"]
mod transcript;

use buddy_core::display::CharacterGrid;
use buddy_core::hal::{AnalogLine, Board, NoopIndicators, NoopMotor, NoopSpeaker, TickSource};
use buddy_core::input::{ButtonLadder, LogicalInput};
use buddy_core::session::StudySession;
use embassy_futures::block_on;

use transcript::TranscriptLogger;

use LogicalInput::{Down, Right, Select, Up};

const TRANSCRIPT_DIR: &str = "transcripts";

struct Scenario {
    name: &'static str,
    header: &'static str,
    presses: &'static [LogicalInput],
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "two-rotations",
        header: "Study Buddy scripted session: 05/05m x2",
        presses: &[
            Select, Down, Down, Down, Down, Down, Right, Select, Down, Down, Down, Down, Down,
            Right, Select, Up, Select,
        ],
    },
    Scenario {
        name: "single-rotation",
        header: "Study Buddy scripted session: 01/02m x1",
        presses: &[
            Select, Down, Down, Down, Down, Down, Right, Down, Down, Down, Down, Select, Down,
            Down, Down, Down, Down, Right, Down, Down, Down, Select, Select,
        ],
    },
    Scenario {
        name: "no-rotations",
        header: "Study Buddy scripted session: 55/55m x0",
        presses: &[Up, Select, Select, Select, Down, Select],
    },
];

fn main() -> io::Result<()> {
    for scenario in SCENARIOS {
        record_scenario(scenario)?;
    }
    Ok(())
}

fn record_scenario(scenario: &Scenario) -> io::Result<()> {
    let path = Path::new(TRANSCRIPT_DIR).join(format!("{}.log", scenario.name));
    let transcript = TranscriptLogger::create(&path, scenario.header)?;

    let board = Board::new(
        CountingTick::default(),
        ScriptedLine::pressing(scenario.presses),
        CharacterGrid::new(),
        NoopSpeaker,
        NoopMotor,
        NoopIndicators,
    );
    let mut session = StudySession::new(board, transcript);
    let config = block_on(session.run_session());

    let (board, mut transcript) = session.into_parts();
    transcript.note(&format!("session complete: {config}"));
    transcript.note(&format!("ticks consumed: {}", board.tick.ticks));
    transcript.note(&format!(
        "final screen: {:?} / {:?}",
        board.display.visible_text(0),
        board.display.visible_text(1)
    ));
    transcript.finish()?;

    println!("wrote {}", path.display());
    Ok(())
}

/// Tick latch that is always set, so scripted sessions finish immediately.
#[derive(Default)]
struct CountingTick {
    ticks: u32,
}

impl TickSource for CountingTick {
    fn second_elapsed(&mut self) -> bool {
        self.ticks += 1;
        true
    }
}

/// Replays one press/release cycle per scripted button.
struct ScriptedLine {
    samples: VecDeque<u16>,
}

impl ScriptedLine {
    fn pressing(presses: &[LogicalInput]) -> Self {
        let ladder = ButtonLadder::DEFAULT;
        let samples = presses
            .iter()
            .filter_map(|input| ladder.band_for(*input))
            .flat_map(|band| [band.midpoint(), 0])
            .collect();
        Self { samples }
    }
}

impl AnalogLine for ScriptedLine {
    fn sample(&mut self) -> u16 {
        // Running dry means the scenario's presses never finish a session.
        self.samples
            .pop_front()
            .unwrap_or_else(|| panic!("scripted presses exhausted"))
    }
}
