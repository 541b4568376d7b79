//! Numeric field editors driven by logical button inputs.
//!
//! Editors are pure state machines: [`FieldEditor::apply`] consumes one input
//! and reports an [`EditAction`] describing what changed, and
//! [`render_action`] mirrors that change onto the display without redrawing
//! the whole field. The session machine owns the read loop.

use crate::hal::{CharacterDisplay, CursorShift};
use crate::input::LogicalInput;

/// Direction of a single digit step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Step {
    Increment,
    Decrement,
}

/// Steps a decimal digit, wrapping 9→0 and 0→9.
#[must_use]
pub const fn step_digit(current: u8, step: Step) -> u8 {
    let current = current % 10;
    match step {
        Step::Increment => (current + 1) % 10,
        Step::Decrement => (current + 9) % 10,
    }
}

/// Which digit of a two-digit field is being edited.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DigitFocus {
    /// Left-hand digit.
    Tens,
    /// Right-hand digit.
    Units,
}

/// Effect of one input on an editor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EditAction {
    /// Input had no effect.
    Ignored,
    /// Focus moved one cell in the given direction.
    FocusMoved(CursorShift),
    /// The focused digit now holds the given value.
    DigitChanged(u8),
    /// Editing finished with the given field value.
    Committed(u8),
}

/// Shared surface of the numeric editors.
pub trait FieldEditor {
    /// Applies one logical input.
    fn apply(&mut self, input: LogicalInput) -> EditAction;

    /// Current field value.
    fn value(&self) -> u8;

    /// Draws the field from scratch and parks the cursor on the focused digit.
    fn render<D>(&self, display: &mut D)
    where
        D: CharacterDisplay + ?Sized;
}

/// Digit both two-digit editors start from.
pub const DEFAULT_MINUTES_DIGIT: u8 = 5;
/// Starting rotation count.
pub const DEFAULT_ROTATIONS: u8 = 1;

/// Two-digit minute entry such as "Study Time: 55m".
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TwoDigitEditor {
    label: &'static str,
    tens: u8,
    units: u8,
    focus: DigitFocus,
}

impl TwoDigitEditor {
    /// Creates an editor focused on the tens digit.
    #[must_use]
    pub const fn new(label: &'static str, tens: u8, units: u8) -> Self {
        Self {
            label,
            tens: tens % 10,
            units: units % 10,
            focus: DigitFocus::Tens,
        }
    }

    /// Creates an editor showing the default 55 minutes.
    #[must_use]
    pub const fn with_defaults(label: &'static str) -> Self {
        Self::new(label, DEFAULT_MINUTES_DIGIT, DEFAULT_MINUTES_DIGIT)
    }

    /// Returns the field label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the focused digit.
    #[must_use]
    pub const fn focus(&self) -> DigitFocus {
        self.focus
    }

    /// Returns `(tens, units)`.
    #[must_use]
    pub const fn digits(&self) -> (u8, u8) {
        (self.tens, self.units)
    }

    fn step_focused(&mut self, step: Step) -> u8 {
        let digit = match self.focus {
            DigitFocus::Tens => &mut self.tens,
            DigitFocus::Units => &mut self.units,
        };
        *digit = step_digit(*digit, step);
        *digit
    }
}

impl FieldEditor for TwoDigitEditor {
    fn apply(&mut self, input: LogicalInput) -> EditAction {
        match input {
            LogicalInput::Left if self.focus == DigitFocus::Units => {
                self.focus = DigitFocus::Tens;
                EditAction::FocusMoved(CursorShift::Left)
            }
            LogicalInput::Right if self.focus == DigitFocus::Tens => {
                self.focus = DigitFocus::Units;
                EditAction::FocusMoved(CursorShift::Right)
            }
            LogicalInput::Up => EditAction::DigitChanged(self.step_focused(Step::Increment)),
            LogicalInput::Down => EditAction::DigitChanged(self.step_focused(Step::Decrement)),
            LogicalInput::Select => EditAction::Committed(self.value()),
            LogicalInput::Left | LogicalInput::Right | LogicalInput::None => EditAction::Ignored,
        }
    }

    fn value(&self) -> u8 {
        self.tens * 10 + self.units
    }

    fn render<D>(&self, display: &mut D)
    where
        D: CharacterDisplay + ?Sized,
    {
        display.clear();
        display.print_str(self.label);
        display.print_digit(self.tens);
        display.print_digit(self.units);
        display.print_char('m');
        display.move_cursor(CursorShift::Left, 3);
        if self.focus == DigitFocus::Units {
            display.move_cursor(CursorShift::Right, 1);
        }
    }
}

/// Single-digit rotation count entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RotationEditor {
    label: &'static str,
    value: u8,
}

impl RotationEditor {
    /// Creates an editor starting at `value`.
    #[must_use]
    pub const fn new(label: &'static str, value: u8) -> Self {
        Self {
            label,
            value: value % 10,
        }
    }

    /// Creates an editor starting at one rotation.
    #[must_use]
    pub const fn with_defaults(label: &'static str) -> Self {
        Self::new(label, DEFAULT_ROTATIONS)
    }
}

impl FieldEditor for RotationEditor {
    fn apply(&mut self, input: LogicalInput) -> EditAction {
        match input {
            LogicalInput::Up => {
                self.value = step_digit(self.value, Step::Increment);
                EditAction::DigitChanged(self.value)
            }
            LogicalInput::Down => {
                self.value = step_digit(self.value, Step::Decrement);
                EditAction::DigitChanged(self.value)
            }
            LogicalInput::Select => EditAction::Committed(self.value),
            LogicalInput::Left | LogicalInput::Right | LogicalInput::None => EditAction::Ignored,
        }
    }

    fn value(&self) -> u8 {
        self.value
    }

    fn render<D>(&self, display: &mut D)
    where
        D: CharacterDisplay + ?Sized,
    {
        display.clear();
        display.print_str(self.label);
        display.print_digit(self.value);
        display.move_cursor(CursorShift::Left, 1);
    }
}

/// Mirrors an [`EditAction`] onto a display whose cursor sits on the focused digit.
pub fn render_action<D>(display: &mut D, action: EditAction)
where
    D: CharacterDisplay + ?Sized,
{
    match action {
        EditAction::FocusMoved(direction) => display.move_cursor(direction, 1),
        EditAction::DigitChanged(digit) => {
            display.print_digit(digit);
            display.move_cursor(CursorShift::Left, 1);
        }
        EditAction::Ignored | EditAction::Committed(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::CharacterGrid;

    #[test]
    fn step_digit_wraps_modulo_ten() {
        for value in 0..10 {
            assert_eq!(step_digit(value, Step::Increment), (value + 1) % 10);
            assert_eq!(step_digit(value, Step::Decrement), (value + 9) % 10);
        }
    }

    #[test]
    fn up_up_right_down_select_yields_seventy_four() {
        let mut editor = TwoDigitEditor::with_defaults("Study Time: ");
        let inputs = [
            LogicalInput::Up,
            LogicalInput::Up,
            LogicalInput::Right,
            LogicalInput::Down,
            LogicalInput::Select,
        ];

        let mut last = EditAction::Ignored;
        for input in inputs {
            last = editor.apply(input);
        }

        assert_eq!(last, EditAction::Committed(74));
        assert_eq!(editor.digits(), (7, 4));
        assert_eq!(editor.focus(), DigitFocus::Units);
    }

    #[test]
    fn repeated_focus_switch_is_a_no_op() {
        let mut editor = TwoDigitEditor::with_defaults("Break Time: ");

        assert_eq!(
            editor.apply(LogicalInput::Right),
            EditAction::FocusMoved(CursorShift::Right)
        );
        assert_eq!(editor.apply(LogicalInput::Right), EditAction::Ignored);
        assert_eq!(editor.focus(), DigitFocus::Units);

        assert_eq!(
            editor.apply(LogicalInput::Left),
            EditAction::FocusMoved(CursorShift::Left)
        );
        assert_eq!(editor.apply(LogicalInput::Left), EditAction::Ignored);
        assert_eq!(editor.focus(), DigitFocus::Tens);
    }

    #[test]
    fn digits_wrap_within_the_field() {
        let mut editor = TwoDigitEditor::new("Study Time: ", 9, 0);
        assert_eq!(editor.apply(LogicalInput::Up), EditAction::DigitChanged(0));
        editor.apply(LogicalInput::Right);
        assert_eq!(editor.apply(LogicalInput::Down), EditAction::DigitChanged(9));
        assert_eq!(editor.value(), 9);
    }

    #[test]
    fn rotation_editor_ignores_focus_inputs() {
        let mut editor = RotationEditor::with_defaults("Rotations: ");
        assert_eq!(editor.apply(LogicalInput::Left), EditAction::Ignored);
        assert_eq!(editor.apply(LogicalInput::Right), EditAction::Ignored);
        assert_eq!(editor.apply(LogicalInput::Down), EditAction::DigitChanged(0));
        assert_eq!(editor.apply(LogicalInput::Down), EditAction::DigitChanged(9));
        assert_eq!(editor.apply(LogicalInput::Select), EditAction::Committed(9));
    }

    #[test]
    fn render_places_cursor_on_tens_digit() {
        let mut grid = CharacterGrid::new();
        let editor = TwoDigitEditor::with_defaults("Study Time: ");
        editor.render(&mut grid);

        assert_eq!(grid.visible_text(0), "Study Time: 55m");
        assert_eq!(grid.cursor(), 12);
    }

    #[test]
    fn rendered_actions_track_the_editor() {
        let mut grid = CharacterGrid::new();
        let mut editor = TwoDigitEditor::with_defaults("Study Time: ");
        editor.render(&mut grid);

        for input in [
            LogicalInput::Up,
            LogicalInput::Up,
            LogicalInput::Right,
            LogicalInput::Down,
        ] {
            let action = editor.apply(input);
            render_action(&mut grid, action);
        }

        assert_eq!(grid.visible_text(0), "Study Time: 74m");
        assert_eq!(grid.cursor(), 13);

        let action = editor.apply(LogicalInput::Right);
        render_action(&mut grid, action);
        assert_eq!(grid.cursor(), 13);
    }

    #[test]
    fn rotation_render_shows_single_digit() {
        let mut grid = CharacterGrid::new();
        let mut editor = RotationEditor::with_defaults("Rotations: ");
        editor.render(&mut grid);
        let action = editor.apply(LogicalInput::Up);
        render_action(&mut grid, action);

        assert_eq!(grid.visible_text(0), "Rotations: 2");
        assert_eq!(grid.cursor(), 11);
    }
}
