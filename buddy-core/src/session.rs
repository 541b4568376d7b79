//! Session state machine: welcome, configuration, countdown rotations, closing.
//!
//! [`StudySession`] owns the [`Board`] for the lifetime of the program and
//! walks the same cycle forever:
//!
//! ```text
//! Welcome -> ConfigStudy -> ConfigBreak -> ConfigRotations -> Confirm
//!         -> (StudyPhase [-> BreakPhase])* -> Closing -> Welcome
//! ```
//!
//! Every wait inside the cycle is one of the named suspension points: a tick
//! ([`crate::tick`]), a button press/release cycle ([`ButtonLadder::user_input`]),
//! or a feedback service finishing. Nothing interrupts a running countdown.

use core::fmt;

use crate::countdown::{run_countdown, SECONDS_PER_MINUTE};
use crate::editor::{render_action, EditAction, FieldEditor, RotationEditor, TwoDigitEditor};
use crate::feedback::{blink_transition, play_cue, show_pattern, Cue, LedPattern};
use crate::hal::{AnalogLine, Board, CharacterDisplay, Indicators, Motor, Speaker, TickSource};
use crate::input::{ButtonLadder, LogicalInput};
use crate::telemetry::{SessionEvent, TelemetrySink};
use crate::tick::dwell;

pub const WELCOME_TITLE: &str = "Welcome to:";
pub const WELCOME_NAME: &str = "Study Buddy";
pub const START_PROMPT: &str = "Press select";
pub const START_PROMPT_SECOND_ROW: &str = "to start:";
pub const STUDY_EDITOR_LABEL: &str = "Study Time: ";
pub const BREAK_EDITOR_LABEL: &str = "Break Time: ";
pub const ROTATIONS_EDITOR_LABEL: &str = "Rotations: ";
pub const CONFIRM_LABEL: &str = "You chose: ";
pub const CONFIRM_SUFFIX: &str = " times!! :D";
pub const SWITCH_BANNER: &str = "Switch!";
pub const CLOSING_BANNER: &str = "All Done!";

/// Longest configurable phase, in minutes.
pub const MAX_MINUTES: u8 = 99;
/// Largest configurable rotation count.
pub const MAX_ROTATIONS: u8 = 9;

/// Half of a rotation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Study,
    Break,
}

impl Phase {
    /// Top-row text drawn ahead of the running countdown.
    #[must_use]
    pub const fn banner(self) -> &'static str {
        match self {
            Phase::Study => "Study Time ",
            Phase::Break => "Break Time ",
        }
    }

    #[must_use]
    pub const fn as_index(self) -> u8 {
        match self {
            Phase::Study => 0,
            Phase::Break => 1,
        }
    }

    /// The phase that follows this one within a session.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Phase::Study => Phase::Break,
            Phase::Break => Phase::Study,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Study => f.write_str("study"),
            Phase::Break => f.write_str("break"),
        }
    }
}

/// Rejected session parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    StudyMinutesOutOfRange(u8),
    BreakMinutesOutOfRange(u8),
    RotationsOutOfRange(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::StudyMinutesOutOfRange(value) => {
                write!(f, "study time {value}m exceeds {MAX_MINUTES}m")
            }
            ConfigError::BreakMinutesOutOfRange(value) => {
                write!(f, "break time {value}m exceeds {MAX_MINUTES}m")
            }
            ConfigError::RotationsOutOfRange(value) => {
                write!(f, "{value} rotations exceeds {MAX_ROTATIONS}")
            }
        }
    }
}

/// Parameters chosen during configuration. Immutable once the countdown starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SessionConfig {
    study_minutes: u8,
    break_minutes: u8,
    rotations: u8,
}

impl SessionConfig {
    /// Values the editors start from.
    pub const DEFAULT: Self = Self {
        study_minutes: 55,
        break_minutes: 55,
        rotations: 1,
    };

    /// Validates and bundles session parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value cannot be entered on the device.
    pub const fn new(
        study_minutes: u8,
        break_minutes: u8,
        rotations: u8,
    ) -> Result<Self, ConfigError> {
        if study_minutes > MAX_MINUTES {
            return Err(ConfigError::StudyMinutesOutOfRange(study_minutes));
        }
        if break_minutes > MAX_MINUTES {
            return Err(ConfigError::BreakMinutesOutOfRange(break_minutes));
        }
        if rotations > MAX_ROTATIONS {
            return Err(ConfigError::RotationsOutOfRange(rotations));
        }
        Ok(Self {
            study_minutes,
            break_minutes,
            rotations,
        })
    }

    /// Bundles session parameters, clamping each into range.
    #[must_use]
    pub const fn saturating(study_minutes: u8, break_minutes: u8, rotations: u8) -> Self {
        Self {
            study_minutes: min(study_minutes, MAX_MINUTES),
            break_minutes: min(break_minutes, MAX_MINUTES),
            rotations: min(rotations, MAX_ROTATIONS),
        }
    }

    #[must_use]
    pub const fn study_minutes(&self) -> u8 {
        self.study_minutes
    }

    #[must_use]
    pub const fn break_minutes(&self) -> u8 {
        self.break_minutes
    }

    #[must_use]
    pub const fn rotations(&self) -> u8 {
        self.rotations
    }

    /// Configured length of `phase`, in minutes.
    #[must_use]
    pub const fn minutes_for(&self, phase: Phase) -> u8 {
        match phase {
            Phase::Study => self.study_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    /// Number of study phases the session runs.
    #[must_use]
    pub const fn study_phases(&self) -> u8 {
        self.rotations
    }

    /// Number of break phases the session runs; the last rotation has none.
    #[must_use]
    pub const fn break_phases(&self) -> u8 {
        self.rotations.saturating_sub(1)
    }

    /// Total countdown length across every phase, in seconds.
    #[must_use]
    pub fn total_seconds(&self) -> u32 {
        let study = u32::from(self.study_minutes) * u32::from(self.study_phases());
        let rest = u32::from(self.break_minutes) * u32::from(self.break_phases());
        (study + rest) * SECONDS_PER_MINUTE
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02}m x{}",
            self.study_minutes, self.break_minutes, self.rotations
        )
    }
}

const fn min(value: u8, limit: u8) -> u8 {
    if value > limit { limit } else { value }
}

/// Where the session machine currently is.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionState {
    Welcome,
    ConfigStudy,
    ConfigBreak,
    ConfigRotations,
    Confirm,
    StudyPhase { rotation: u8 },
    BreakPhase { rotation: u8 },
    Closing,
}

impl SessionState {
    /// Countdown state for `phase` of the rotation labelled `rotation`.
    #[must_use]
    pub const fn for_phase(phase: Phase, rotation: u8) -> Self {
        match phase {
            Phase::Study => SessionState::StudyPhase { rotation },
            Phase::Break => SessionState::BreakPhase { rotation },
        }
    }

    /// Deterministic index that ignores the rotation label.
    #[must_use]
    pub const fn as_index(self) -> u8 {
        match self {
            SessionState::Welcome => 0,
            SessionState::ConfigStudy => 1,
            SessionState::ConfigBreak => 2,
            SessionState::ConfigRotations => 3,
            SessionState::Confirm => 4,
            SessionState::StudyPhase { .. } => 5,
            SessionState::BreakPhase { .. } => 6,
            SessionState::Closing => 7,
        }
    }

    /// Returns `true` while a countdown is running.
    #[must_use]
    pub const fn is_countdown(self) -> bool {
        matches!(
            self,
            SessionState::StudyPhase { .. } | SessionState::BreakPhase { .. }
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Welcome => f.write_str("welcome"),
            SessionState::ConfigStudy => f.write_str("config-study"),
            SessionState::ConfigBreak => f.write_str("config-break"),
            SessionState::ConfigRotations => f.write_str("config-rotations"),
            SessionState::Confirm => f.write_str("confirm"),
            SessionState::StudyPhase { rotation } => write!(f, "study-phase {rotation}"),
            SessionState::BreakPhase { rotation } => write!(f, "break-phase {rotation}"),
            SessionState::Closing => f.write_str("closing"),
        }
    }
}

/// Tick counts for the fixed pauses between states.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SessionTiming {
    /// Ticks the welcome banner stays up before the start prompt.
    pub welcome_dwell: u8,
    /// Ticks the chosen configuration stays up.
    pub confirm_dwell: u8,
    /// Ticks the closing banner stays up.
    pub closing_dwell: u8,
    /// LED alternations after each phase.
    pub blink_alternations: u8,
    /// Ticks between consecutive welcome/configuration screens and after each phase.
    pub settle_ticks: u8,
}

impl SessionTiming {
    pub const DEFAULT: Self = Self {
        welcome_dwell: 3,
        confirm_dwell: 3,
        closing_dwell: 3,
        blink_alternations: 2,
        settle_ticks: 1,
    };
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The appliance's control loop.
pub struct StudySession<T, A, D, S, M, L, K> {
    board: Board<T, A, D, S, M, L>,
    ladder: ButtonLadder,
    timing: SessionTiming,
    telemetry: K,
    state: SessionState,
}

impl<T, A, D, S, M, L, K> StudySession<T, A, D, S, M, L, K>
where
    T: TickSource,
    A: AnalogLine,
    D: CharacterDisplay,
    S: Speaker,
    M: Motor,
    L: Indicators,
    K: TelemetrySink,
{
    /// Creates a session machine with the default ladder and timing.
    pub const fn new(board: Board<T, A, D, S, M, L>, telemetry: K) -> Self {
        Self {
            board,
            ladder: ButtonLadder::DEFAULT,
            timing: SessionTiming::DEFAULT,
            telemetry,
            state: SessionState::Welcome,
        }
    }

    /// Replaces the button band table.
    #[must_use]
    pub fn with_ladder(mut self, ladder: ButtonLadder) -> Self {
        self.ladder = ladder;
        self
    }

    /// Replaces the inter-state pauses.
    #[must_use]
    pub fn with_timing(mut self, timing: SessionTiming) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn board(&self) -> &Board<T, A, D, S, M, L> {
        &self.board
    }

    #[must_use]
    pub const fn telemetry(&self) -> &K {
        &self.telemetry
    }

    /// Releases the peripherals and the telemetry sink.
    #[must_use]
    pub fn into_parts(self) -> (Board<T, A, D, S, M, L>, K) {
        (self.board, self.telemetry)
    }

    /// Puts the outputs into their power-on state: both LEDs dark.
    pub fn power_on(&mut self) {
        self.show_leds(LedPattern::Off);
    }

    /// Runs sessions back to back. Never returns.
    pub async fn run(&mut self) {
        self.power_on();
        loop {
            self.run_session().await;
        }
    }

    /// Runs one full cycle from the welcome screen through closing.
    pub async fn run_session(&mut self) -> SessionConfig {
        self.welcome().await;
        self.settle().await;

        self.enter(SessionState::ConfigStudy);
        let study = self
            .edit_field(TwoDigitEditor::with_defaults(STUDY_EDITOR_LABEL))
            .await;
        self.settle().await;

        self.enter(SessionState::ConfigBreak);
        let rest = self
            .edit_field(TwoDigitEditor::with_defaults(BREAK_EDITOR_LABEL))
            .await;
        self.settle().await;

        self.enter(SessionState::ConfigRotations);
        let rotations = self
            .edit_field(RotationEditor::with_defaults(ROTATIONS_EDITOR_LABEL))
            .await;

        // Editor output is already in range.
        let config = SessionConfig::saturating(study, rest, rotations);
        self.confirm(config).await;
        self.run_rotations(config).await;
        self.closing().await;

        config
    }

    /// Shows the intro and waits for a Select press.
    pub async fn welcome(&mut self) {
        self.enter(SessionState::Welcome);
        self.cue(Cue::Intro).await;

        self.show_two_rows(WELCOME_TITLE, WELCOME_NAME);
        dwell(&mut self.board.tick, self.timing.welcome_dwell).await;

        self.show_two_rows(START_PROMPT, START_PROMPT_SECOND_ROW);
        while self.read_button().await != LogicalInput::Select {}
    }

    /// Runs an editor until Select and returns the committed value.
    pub async fn edit_field<E>(&mut self, mut editor: E) -> u8
    where
        E: FieldEditor,
    {
        editor.render(&mut self.board.display);
        loop {
            let input = self.read_button().await;
            match editor.apply(input) {
                EditAction::Committed(value) => return value,
                action => render_action(&mut self.board.display, action),
            }
        }
    }

    /// Shows the chosen configuration.
    pub async fn confirm(&mut self, config: SessionConfig) {
        self.enter(SessionState::Confirm);
        self.telemetry.record(SessionEvent::ConfigCommitted(config));

        let display = &mut self.board.display;
        display.clear();
        display.print_str(CONFIRM_LABEL);
        print_two_digits(display, config.study_minutes());
        display.print_char('/');
        print_two_digits(display, config.break_minutes());
        display.reset_cursor();
        display.advance_row();
        display.print_digit(config.rotations());
        display.print_str(CONFIRM_SUFFIX);

        dwell(&mut self.board.tick, self.timing.confirm_dwell).await;
    }

    /// Runs every study phase and every break phase but the last.
    pub async fn run_rotations(&mut self, config: SessionConfig) {
        for rotation in (1..=config.rotations()).rev() {
            self.run_phase(Phase::Study, config.study_minutes(), rotation)
                .await;
            if rotation > 1 {
                self.run_phase(Phase::Break, config.break_minutes(), rotation)
                    .await;
            }
        }
    }

    /// Runs one countdown phase including its cue and trailing LED transition.
    pub async fn run_phase(&mut self, phase: Phase, minutes: u8, rotation: u8) {
        self.enter(SessionState::for_phase(phase, rotation));
        if phase == Phase::Study {
            self.show_leds(LedPattern::for_phase(phase));
        }
        self.cue(Cue::for_phase(phase)).await;

        self.board.display.clear();
        self.board.display.reset_cursor();
        self.board.display.print_str(phase.banner());

        self.telemetry.record(SessionEvent::CountdownStarted {
            phase,
            rotation,
            total_seconds: u32::from(minutes) * SECONDS_PER_MINUTE,
        });

        let alternations = self.timing.blink_alternations;
        let Self {
            board, telemetry, ..
        } = self;
        let decrements = run_countdown(
            &mut board.tick,
            &mut board.display,
            minutes,
            rotation,
            |state| {
                telemetry.record(SessionEvent::CountdownTick {
                    remaining: state.remaining_seconds(),
                });
            },
        )
        .await;

        telemetry.record(SessionEvent::CountdownFinished {
            phase,
            rotation,
            decrements,
        });

        board.display.clear();
        board.display.print_str(SWITCH_BANNER);
        blink_transition(
            &mut board.leds,
            &mut board.tick,
            phase,
            alternations,
            |pattern| telemetry.record(SessionEvent::LedsChanged(pattern)),
        )
        .await;

        self.settle().await;
        if phase == Phase::Study {
            self.board.display.clear();
        }
    }

    /// Turns the LEDs off and shows the closing banner.
    pub async fn closing(&mut self) {
        self.enter(SessionState::Closing);
        self.show_leds(LedPattern::Off);
        self.cue(Cue::Closing).await;

        self.board.display.clear();
        self.board.display.reset_cursor();
        self.board.display.print_str(CLOSING_BANNER);
        dwell(&mut self.board.tick, self.timing.closing_dwell).await;
    }

    async fn read_button(&mut self) -> LogicalInput {
        let input = self.ladder.user_input(&mut self.board.line).await;
        self.telemetry.record(SessionEvent::ButtonPressed(input));
        input
    }

    async fn cue(&mut self, cue: Cue) {
        self.telemetry.record(SessionEvent::CueStarted(cue));
        play_cue(&mut self.board.speaker, &mut self.board.motor, cue).await;
    }

    async fn settle(&mut self) {
        dwell(&mut self.board.tick, self.timing.settle_ticks).await;
    }

    fn enter(&mut self, state: SessionState) {
        self.state = state;
        self.telemetry.record(SessionEvent::StateEntered(state));
    }

    fn show_leds(&mut self, pattern: LedPattern) {
        show_pattern(&mut self.board.leds, pattern);
        self.telemetry.record(SessionEvent::LedsChanged(pattern));
    }

    fn show_two_rows(&mut self, top: &str, bottom: &str) {
        let display = &mut self.board.display;
        display.clear();
        display.print_str(top);
        display.reset_cursor();
        display.advance_row();
        display.print_str(bottom);
    }
}

fn print_two_digits<D>(display: &mut D, value: u8)
where
    D: CharacterDisplay + ?Sized,
{
    display.print_digit(value / 10);
    display.print_digit(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_values_the_editors_cannot_produce() {
        assert_eq!(
            SessionConfig::new(100, 5, 1),
            Err(ConfigError::StudyMinutesOutOfRange(100))
        );
        assert_eq!(
            SessionConfig::new(5, 120, 1),
            Err(ConfigError::BreakMinutesOutOfRange(120))
        );
        assert_eq!(
            SessionConfig::new(5, 5, 10),
            Err(ConfigError::RotationsOutOfRange(10))
        );
        assert!(SessionConfig::new(99, 0, 9).is_ok());
    }

    #[test]
    fn saturating_config_clamps_each_field() {
        let config = SessionConfig::saturating(250, 42, 12);
        assert_eq!(config.study_minutes(), MAX_MINUTES);
        assert_eq!(config.break_minutes(), 42);
        assert_eq!(config.rotations(), MAX_ROTATIONS);
    }

    #[test]
    fn final_rotation_has_no_break() {
        let config = SessionConfig::new(5, 5, 2).unwrap();
        assert_eq!(config.study_phases(), 2);
        assert_eq!(config.break_phases(), 1);
        assert_eq!(config.total_seconds(), 900);

        let none = SessionConfig::new(5, 5, 0).unwrap();
        assert_eq!(none.break_phases(), 0);
        assert_eq!(none.total_seconds(), 0);
    }

    #[test]
    fn default_config_matches_editor_start_values() {
        let config = SessionConfig::default();
        assert_eq!(config.study_minutes(), 55);
        assert_eq!(config.break_minutes(), 55);
        assert_eq!(config.rotations(), 1);
    }

    #[test]
    fn phases_alternate() {
        assert_eq!(Phase::Study.next(), Phase::Break);
        assert_eq!(Phase::Break.next(), Phase::Study);
        assert_eq!(Phase::Study.next().next(), Phase::Study);
    }

    #[test]
    fn state_labels_and_indices() {
        let state = SessionState::for_phase(Phase::Break, 3);
        assert_eq!(state, SessionState::BreakPhase { rotation: 3 });
        assert!(state.is_countdown());
        assert!(!SessionState::Confirm.is_countdown());
        assert_eq!(state.as_index(), 6);

        let mut buffer = heapless::String::<32>::new();
        core::fmt::write(&mut buffer, format_args!("{state}")).unwrap();
        assert_eq!(buffer.as_str(), "break-phase 3");
    }

    #[test]
    fn config_error_display() {
        let mut buffer = heapless::String::<48>::new();
        core::fmt::write(
            &mut buffer,
            format_args!("{}", ConfigError::RotationsOutOfRange(12)),
        )
        .unwrap();
        assert_eq!(buffer.as_str(), "12 rotations exceeds 9");
    }
}
