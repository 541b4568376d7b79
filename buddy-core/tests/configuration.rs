mod support;

use buddy_core::editor::{RotationEditor, TwoDigitEditor};
use buddy_core::input::{ButtonBand, ButtonLadder, DEFAULT_NOISE_FLOOR, LogicalInput};
use buddy_core::session::{ROTATIONS_EDITOR_LABEL, STUDY_EDITOR_LABEL, SessionConfig, SessionState};
use buddy_core::telemetry::SessionEvent;
use embassy_futures::block_on;

use support::{session, session_with_line, ScriptedLine};

use LogicalInput::{Down, Left, Right, Select, Up};

#[test]
fn up_up_right_down_select_commits_seventy_four() {
    let mut session = session(&[Up, Up, Right, Down, Select]);

    let value = block_on(session.edit_field(TwoDigitEditor::with_defaults(STUDY_EDITOR_LABEL)));

    assert_eq!(value, 74);
    let display = &session.board().display;
    assert_eq!(display.grid.visible_text(0), "Study Time: 74m");
    assert_eq!(display.grid.cursor(), 13, "cursor rests on the units digit");
}

#[test]
fn repeated_focus_presses_do_not_move_the_cursor() {
    let mut session = session(&[Right, Right, Right, Up, Left, Left, Up, Select]);

    let value = block_on(session.edit_field(TwoDigitEditor::with_defaults(STUDY_EDITOR_LABEL)));

    assert_eq!(value, 66);
    assert_eq!(session.board().display.grid.cursor(), 12);
}

#[test]
fn digits_wrap_while_editing() {
    let mut session = session(&[
        Up, Up, Up, Up, Up, Right, Down, Down, Down, Down, Down, Down, Select,
    ]);

    let value = block_on(session.edit_field(TwoDigitEditor::with_defaults(STUDY_EDITOR_LABEL)));

    assert_eq!(value, 9);
    assert_eq!(session.board().display.grid.visible_text(0), "Study Time: 09m");
}

#[test]
fn rotation_editor_wraps_through_zero() {
    let mut session = session(&[Down, Down, Left, Right, Select]);

    let value = block_on(session.edit_field(RotationEditor::with_defaults(ROTATIONS_EDITOR_LABEL)));

    assert_eq!(value, 9);
    assert_eq!(session.board().display.grid.visible_text(0), "Rotations: 9");
}

#[test]
fn welcome_waits_for_select_only() {
    let mut session = session(&[Up, Left, Down, Right, Select]);

    block_on(session.welcome());

    assert_eq!(session.state(), SessionState::Welcome);
    let presses = session
        .telemetry()
        .events
        .iter()
        .filter(|event| matches!(event, SessionEvent::ButtonPressed(_)))
        .count();
    assert_eq!(presses, 5);
    assert_eq!(session.board().line.remaining(), 0);
    assert_eq!(session.board().tick.ticks, 3);
}

#[test]
fn presses_between_bands_are_ignored_by_editors() {
    let ladder = ButtonLadder::DEFAULT;
    let up = ladder.band_for(Up).map(|band| band.midpoint()).unwrap();
    let select = ladder.band_for(Select).map(|band| band.midpoint()).unwrap();
    // 0x800 lies between the Up and Down bands.
    let line = ScriptedLine::raw(&[0x800, 0x000, up, 0x000, 0x800, 0x000, select, 0x000]);
    let mut session = session_with_line(line);

    let value = block_on(session.edit_field(TwoDigitEditor::with_defaults(STUDY_EDITOR_LABEL)));

    assert_eq!(value, 65);
    let unmapped = session
        .telemetry()
        .events
        .iter()
        .filter(|event| matches!(event, SessionEvent::ButtonPressed(LogicalInput::None)))
        .count();
    assert_eq!(unmapped, 2);
}

#[test]
fn held_button_counts_once() {
    let ladder = ButtonLadder::DEFAULT;
    let up = ladder.band_for(Up).map(|band| band.midpoint()).unwrap();
    let select = ladder.band_for(Select).map(|band| band.midpoint()).unwrap();
    let line = ScriptedLine::raw(&[0, 0, up, up, up, up, 0, select, select, 0]);
    let mut session = session_with_line(line);

    let value = block_on(session.edit_field(TwoDigitEditor::with_defaults(STUDY_EDITOR_LABEL)));

    assert_eq!(value, 65);
}

#[test]
fn confirm_screen_shows_padded_minutes() {
    let mut session = session(&[]);

    block_on(session.confirm(SessionConfig::new(7, 45, 3).unwrap()));

    let display = &session.board().display;
    assert_eq!(display.grid.visible_text(0), "You chose: 07/45");
    assert_eq!(display.grid.visible_text(1), "3 times!! :D");
    assert_eq!(session.board().tick.ticks, 3);
}

#[test]
fn custom_ladder_reclassifies_presses() {
    // Up and Down swap places compared with the default pad.
    let ladder = ButtonLadder::new(
        DEFAULT_NOISE_FLOOR,
        [
            ButtonBand::above(Select, 0xE66),
            ButtonBand::between(Up, 0x8F5, 0xA8F),
            ButtonBand::between(Right, 0x385, 0x4CC),
            ButtonBand::between(Down, 0x51E, 0x75C),
            ButtonBand::between(Left, 0x199, 0x333),
        ],
    )
    .unwrap();
    let up = ladder.band_for(Up).map(|band| band.midpoint()).unwrap();
    let select = ladder.band_for(Select).map(|band| band.midpoint()).unwrap();
    assert_eq!(ButtonLadder::DEFAULT.classify(up), Down);

    let line = ScriptedLine::raw(&[up, 0x000, select, 0x000]);
    let mut session = session_with_line(line).with_ladder(ladder);

    let value = block_on(session.edit_field(TwoDigitEditor::with_defaults(STUDY_EDITOR_LABEL)));

    assert_eq!(value, 65);
}
