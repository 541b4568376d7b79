mod board;
mod transcript;

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use buddy_core::hal::Board;
use buddy_core::input::ButtonLadder;
use buddy_core::session::StudySession;
use buddy_core::telemetry::{SessionEvent, TelemetrySink};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use embassy_futures::select::select;
use embassy_futures::{block_on, yield_now};

use board::{
    HostTick, Keyboard, Keypad, Screen, SharedKeyboard, SharedScreen, StatusLeds, StatusMotor,
    StatusSpeaker, TerminalDisplay,
};
use transcript::TranscriptLogger;

const USAGE: &str = "Usage: buddy-emulator [--speed <factor>] [--transcript <path>] [--ticks]";

#[derive(Debug, Eq, PartialEq)]
struct Options {
    speed: u32,
    transcript: Option<PathBuf>,
    ticks: bool,
}

fn main() -> io::Result<()> {
    let options = parse_options(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    let transcript = match &options.transcript {
        Some(path) => Some(
            TranscriptLogger::create(path, "Study Buddy emulator transcript")?
                .with_ticks(options.ticks),
        ),
        None => None,
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let outcome = run(options.speed, transcript);

    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, Show)?;
    outcome
}

fn run(speed: u32, transcript: Option<TranscriptLogger>) -> io::Result<()> {
    let screen = Screen::shared();
    let keyboard = Keyboard::shared();

    let board = Board::new(
        HostTick::new(speed),
        Keypad::new(ButtonLadder::DEFAULT, SharedKeyboard::clone(&keyboard)),
        TerminalDisplay::new(SharedScreen::clone(&screen)),
        StatusSpeaker::new(SharedScreen::clone(&screen), speed),
        StatusMotor::new(SharedScreen::clone(&screen), speed),
        StatusLeds::new(SharedScreen::clone(&screen)),
    );
    let telemetry = EmulatorTelemetry {
        screen: SharedScreen::clone(&screen),
        transcript,
    };
    let mut session = StudySession::new(board, telemetry);

    block_on(select(session.run(), quit_requested(&keyboard)));

    let (_, telemetry) = session.into_parts();
    if let Some(err) = screen.borrow_mut().take_error() {
        return Err(err);
    }
    match telemetry.transcript {
        Some(transcript) => transcript.finish(),
        None => Ok(()),
    }
}

async fn quit_requested(keyboard: &SharedKeyboard) {
    loop {
        {
            let mut keyboard = keyboard.borrow_mut();
            keyboard.pump(Duration::ZERO);
            if keyboard.quit_requested() {
                return;
            }
        }
        yield_now().await;
    }
}

/// Shows the latest event on the status line and mirrors it to the transcript.
struct EmulatorTelemetry {
    screen: SharedScreen,
    transcript: Option<TranscriptLogger>,
}

impl TelemetrySink for EmulatorTelemetry {
    fn record(&mut self, event: SessionEvent) {
        if !event.is_periodic() {
            self.screen.borrow_mut().set_last_event(event.to_string());
        }
        if let Some(transcript) = self.transcript.as_mut() {
            transcript.record(event);
        }
    }
}

fn parse_options(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut options = Options {
        speed: 1,
        transcript: None,
        ticks: false,
    };
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--speed=") {
            options.speed = parse_speed(value)?;
        } else if arg == "--speed" {
            let value = args
                .next()
                .ok_or_else(|| "Expected value after --speed".to_string())?;
            options.speed = parse_speed(&value)?;
        } else if let Some(value) = arg.strip_prefix("--transcript=") {
            options.transcript = Some(PathBuf::from(value));
        } else if arg == "--transcript" {
            let value = args
                .next()
                .ok_or_else(|| "Expected value after --transcript".to_string())?;
            options.transcript = Some(PathBuf::from(value));
        } else if arg == "--ticks" {
            options.ticks = true;
        } else {
            return Err(format!("Unknown argument `{arg}`"));
        }
    }

    Ok(options)
}

fn parse_speed(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(speed) if speed > 0 => Ok(speed),
        _ => Err(format!("Speed factor must be a positive integer, got `{value}`")),
    }
}
