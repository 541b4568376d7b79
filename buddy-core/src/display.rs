//! Reference model of the HD44780-style character display.
//!
//! The controller keeps 80 cells of display RAM: 40 per row, of which the
//! first [`VISIBLE_COLUMNS`] are on the glass. The cursor walks that RAM
//! linearly and wraps, so jumping 40 cells switches rows. [`CharacterGrid`]
//! reproduces that behaviour without hardware and backs both the emulator and
//! the integration tests.

use core::str;

use crate::hal::{CharacterDisplay, CursorShift};

/// Display RAM cells per row.
pub const ROW_CELLS: usize = 40;
/// Number of rows.
pub const ROWS: usize = 2;
/// Total display RAM cells.
pub const TOTAL_CELLS: usize = ROW_CELLS * ROWS;
/// Columns visible on a 16x2 module.
pub const VISIBLE_COLUMNS: usize = 16;

/// Character printed in place of anything outside printable ASCII.
pub const REPLACEMENT_GLYPH: u8 = b'?';

/// In-memory 2-row character display.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CharacterGrid {
    cells: [u8; TOTAL_CELLS],
    cursor: usize,
}

impl CharacterGrid {
    /// Creates a blank grid with the cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [b' '; TOTAL_CELLS],
            cursor: 0,
        }
    }

    /// Returns the cursor as a linear RAM address.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the cursor as `(row, column)`.
    #[must_use]
    pub const fn cursor_position(&self) -> (usize, usize) {
        (self.cursor / ROW_CELLS, self.cursor % ROW_CELLS)
    }

    /// Returns all 40 cells of `row`. Rows past the last wrap around.
    #[must_use]
    pub fn row(&self, row: usize) -> &str {
        let start = (row % ROWS) * ROW_CELLS;
        let cells = &self.cells[start..start + ROW_CELLS];
        // Cells only ever hold printable ASCII.
        str::from_utf8(cells).unwrap_or("")
    }

    /// Returns the part of `row` visible on a 16x2 module.
    #[must_use]
    pub fn visible_row(&self, row: usize) -> &str {
        &self.row(row)[..VISIBLE_COLUMNS]
    }

    /// Returns the visible part of `row` without trailing blanks.
    #[must_use]
    pub fn visible_text(&self, row: usize) -> &str {
        self.visible_row(row).trim_end()
    }

    fn shift(&mut self, direction: CursorShift, count: usize) {
        let step = count % TOTAL_CELLS;
        self.cursor = match direction {
            CursorShift::Right => (self.cursor + step) % TOTAL_CELLS,
            CursorShift::Left => (self.cursor + TOTAL_CELLS - step) % TOTAL_CELLS,
        };
    }
}

impl Default for CharacterGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterDisplay for CharacterGrid {
    fn clear(&mut self) {
        self.cells = [b' '; TOTAL_CELLS];
        self.cursor = 0;
    }

    fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    fn advance_row(&mut self) {
        self.shift(CursorShift::Right, ROW_CELLS);
    }

    fn print_char(&mut self, c: char) {
        self.cells[self.cursor] = glyph_for(c);
        self.shift(CursorShift::Right, 1);
    }

    fn move_cursor(&mut self, direction: CursorShift, count: u8) {
        self.shift(direction, usize::from(count));
    }
}

/// Maps a character to the display's ROM code. Printable ASCII maps to itself.
#[must_use]
pub fn glyph_for(c: char) -> u8 {
    match u8::try_from(c) {
        Ok(code @ 0x20..=0x7E) => code,
        _ => REPLACEMENT_GLYPH,
    }
}
