#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! HD44780 driver running the controller's 4-bit interface.
//!
//! Pin wiggling lives behind [`LcdBus`] so the command stream can be checked
//! on the host. The driver never reads the busy flag; every write is followed
//! by the worst-case execution delay from the datasheet instead.

use buddy_core::display::glyph_for;
use buddy_core::hal::{CharacterDisplay, CursorShift};

pub const CLEAR_DISPLAY: u8 = 0x01;
pub const RETURN_HOME: u8 = 0x02;
pub const ENTRY_MODE_INCREMENT: u8 = 0x06;
/// Display on, cursor shown, no blink.
pub const DISPLAY_ON_CURSOR: u8 = 0x0E;
pub const CURSOR_SHIFT_LEFT: u8 = 0x10;
pub const CURSOR_SHIFT_RIGHT: u8 = 0x14;
/// Four data lines, two rows, 5x8 font.
pub const FUNCTION_SET_4BIT_2LINE: u8 = 0x28;

/// Cells the cursor must travel to reach the other row.
pub const ROW_STRIDE: u8 = 40;

const POWER_ON_DELAY_US: u32 = 15_000;
const WAKE_DELAY_US: u32 = 4_100;
const WAKE_SHORT_DELAY_US: u32 = 100;
const COMMAND_DELAY_US: u32 = 40;
const HOME_DELAY_US: u32 = 1_600;

/// Register select line state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Register {
    Instruction,
    Data,
}

/// The six wires between the MCU and the module.
pub trait LcdBus {
    /// Drives RS and D7..D4, then pulses EN.
    fn write_nibble(&mut self, register: Register, nibble: u8);

    /// Busy-waits for at least `micros` microseconds.
    fn delay_us(&mut self, micros: u32);
}

/// Splits a byte into the (high, low) nibbles sent over the 4-bit bus.
#[must_use]
pub const fn nibbles(byte: u8) -> (u8, u8) {
    (byte >> 4, byte & 0x0F)
}

pub struct Hd44780<B> {
    bus: B,
}

impl<B> Hd44780<B>
where
    B: LcdBus,
{
    /// Runs the 4-bit power-on sequence and leaves the display blank.
    pub fn new(bus: B) -> Self {
        let mut lcd = Self { bus };
        lcd.initialize();
        lcd
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    fn initialize(&mut self) {
        self.bus.delay_us(POWER_ON_DELAY_US);

        // Force 8-bit mode from any state, then drop to 4-bit.
        self.bus.write_nibble(Register::Instruction, 0x3);
        self.bus.delay_us(WAKE_DELAY_US);
        self.bus.write_nibble(Register::Instruction, 0x3);
        self.bus.delay_us(WAKE_SHORT_DELAY_US);
        self.bus.write_nibble(Register::Instruction, 0x3);
        self.bus.delay_us(WAKE_SHORT_DELAY_US);
        self.bus.write_nibble(Register::Instruction, 0x2);
        self.bus.delay_us(COMMAND_DELAY_US);

        self.command(FUNCTION_SET_4BIT_2LINE);
        self.command(DISPLAY_ON_CURSOR);
        self.command(ENTRY_MODE_INCREMENT);
        self.clear();
    }

    fn command(&mut self, command: u8) {
        self.write_byte(Register::Instruction, command);
        let delay = match command {
            CLEAR_DISPLAY | RETURN_HOME => HOME_DELAY_US,
            _ => COMMAND_DELAY_US,
        };
        self.bus.delay_us(delay);
    }

    fn write_byte(&mut self, register: Register, byte: u8) {
        let (high, low) = nibbles(byte);
        self.bus.write_nibble(register, high);
        self.bus.write_nibble(register, low);
    }

    fn shift_cursor(&mut self, command: u8, count: u8) {
        for _ in 0..count {
            self.command(command);
        }
    }
}

impl<B> CharacterDisplay for Hd44780<B>
where
    B: LcdBus,
{
    fn clear(&mut self) {
        self.command(CLEAR_DISPLAY);
    }

    fn reset_cursor(&mut self) {
        self.command(RETURN_HOME);
    }

    fn advance_row(&mut self) {
        self.shift_cursor(CURSOR_SHIFT_RIGHT, ROW_STRIDE);
    }

    fn print_char(&mut self, c: char) {
        self.write_byte(Register::Data, glyph_for(c));
        self.bus.delay_us(COMMAND_DELAY_US);
    }

    fn move_cursor(&mut self, direction: CursorShift, count: u8) {
        let command = match direction {
            CursorShift::Left => CURSOR_SHIFT_LEFT,
            CursorShift::Right => CURSOR_SHIFT_RIGHT,
        };
        self.shift_cursor(command, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingBus {
        nibbles: Vec<(Register, u8)>,
        waited_us: u64,
    }

    impl RecordingBus {
        /// Reassembles nibble pairs into bytes, skipping `skip` leading nibbles.
        fn bytes(&self, skip: usize) -> Vec<(Register, u8)> {
            self.nibbles[skip..]
                .chunks(2)
                .map(|pair| {
                    assert_eq!(pair[0].0, pair[1].0, "register changed mid-byte");
                    (pair[0].0, (pair[0].1 << 4) | pair[1].1)
                })
                .collect()
        }
    }

    impl LcdBus for RecordingBus {
        fn write_nibble(&mut self, register: Register, nibble: u8) {
            assert!(nibble <= 0x0F);
            self.nibbles.push((register, nibble));
        }

        fn delay_us(&mut self, micros: u32) {
            self.waited_us += u64::from(micros);
        }
    }

    fn initialized() -> Hd44780<RecordingBus> {
        let mut lcd = Hd44780::new(RecordingBus::default());
        lcd.bus.nibbles.clear();
        lcd
    }

    #[test]
    fn power_on_sequence_enters_four_bit_mode() {
        let lcd = Hd44780::new(RecordingBus::default());
        let bus = lcd.into_inner();

        let wake: Vec<u8> = bus.nibbles[..4].iter().map(|(_, nibble)| *nibble).collect();
        assert_eq!(wake, [0x3, 0x3, 0x3, 0x2]);
        assert!(bus.nibbles[..4].iter().all(|(reg, _)| *reg == Register::Instruction));

        let commands: Vec<u8> = bus.bytes(4).into_iter().map(|(_, byte)| byte).collect();
        assert_eq!(
            commands,
            [
                FUNCTION_SET_4BIT_2LINE,
                DISPLAY_ON_CURSOR,
                ENTRY_MODE_INCREMENT,
                CLEAR_DISPLAY
            ]
        );
        assert!(bus.waited_us >= u64::from(POWER_ON_DELAY_US));
    }

    #[test]
    fn characters_go_to_the_data_register_high_nibble_first() {
        let mut lcd = initialized();
        lcd.print_str("A:");

        assert_eq!(
            lcd.bus.nibbles,
            [
                (Register::Data, 0x4),
                (Register::Data, 0x1),
                (Register::Data, 0x3),
                (Register::Data, 0xA),
            ]
        );
    }

    #[test]
    fn unsupported_characters_print_the_replacement_glyph() {
        let mut lcd = initialized();
        lcd.print_char('é');

        assert_eq!(lcd.bus.bytes(0), [(Register::Data, b'?')]);
    }

    #[test]
    fn cursor_moves_are_one_shift_command_per_cell() {
        let mut lcd = initialized();
        lcd.move_cursor(CursorShift::Left, 3);
        lcd.move_cursor(CursorShift::Right, 1);

        let bytes = lcd.bus.bytes(0);
        assert_eq!(
            bytes,
            [
                (Register::Instruction, CURSOR_SHIFT_LEFT),
                (Register::Instruction, CURSOR_SHIFT_LEFT),
                (Register::Instruction, CURSOR_SHIFT_LEFT),
                (Register::Instruction, CURSOR_SHIFT_RIGHT),
            ]
        );
    }

    #[test]
    fn advance_row_walks_forty_cells() {
        let mut lcd = initialized();
        lcd.advance_row();

        let bytes = lcd.bus.bytes(0);
        assert_eq!(bytes.len(), usize::from(ROW_STRIDE));
        assert!(
            bytes
                .iter()
                .all(|entry| *entry == (Register::Instruction, CURSOR_SHIFT_RIGHT))
        );
    }

    #[test]
    fn clear_and_home_wait_for_the_slow_commands() {
        let mut lcd = initialized();
        lcd.bus.waited_us = 0;

        lcd.clear();
        lcd.reset_cursor();

        assert_eq!(
            lcd.bus.bytes(0),
            [
                (Register::Instruction, CLEAR_DISPLAY),
                (Register::Instruction, RETURN_HOME)
            ]
        );
        assert_eq!(lcd.bus.waited_us, 2 * u64::from(HOME_DELAY_US));
    }
}
