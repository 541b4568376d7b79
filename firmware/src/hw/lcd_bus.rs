use embassy_stm32::gpio::{Level, Output};
use embassy_time::{Duration, block_for};

use crate::lcd::{LcdBus, Register};

/// Enable pulse width and setup/hold margin, well above the 450 ns minimum.
const ENABLE_PULSE_US: u64 = 1;

/// Write-only 4-bit parallel bus. R/W is tied low on the board.
pub struct GpioLcdBus<'d> {
    rs: Output<'d>,
    enable: Output<'d>,
    /// D4..D7, least significant first.
    data: [Output<'d>; 4],
}

impl<'d> GpioLcdBus<'d> {
    pub fn new(rs: Output<'d>, enable: Output<'d>, data: [Output<'d>; 4]) -> Self {
        Self { rs, enable, data }
    }

    fn pulse_enable(&mut self) {
        block_for(Duration::from_micros(ENABLE_PULSE_US));
        self.enable.set_high();
        block_for(Duration::from_micros(ENABLE_PULSE_US));
        self.enable.set_low();
    }
}

impl LcdBus for GpioLcdBus<'_> {
    fn write_nibble(&mut self, register: Register, nibble: u8) {
        self.rs.set_level(Level::from(register == Register::Data));
        for (bit, pin) in self.data.iter_mut().enumerate() {
            pin.set_level(Level::from(nibble & (1 << bit) != 0));
        }
        self.pulse_enable();
    }

    fn delay_us(&mut self, micros: u32) {
        block_for(Duration::from_micros(u64::from(micros)));
    }
}
