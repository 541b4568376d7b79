//! embassy-stm32 bindings for the Study Buddy board.
//!
//! # Pin assignments
//!
//! - **PA0**: button ladder (ADC1 IN0)
//! - **PB4..PB7**: LCD D4..D7
//! - **PB8**: LCD RS
//! - **PB9**: LCD EN
//! - **PA6**: piezo speaker (TIM3 CH1)
//! - **PA7**: vibration motor driver
//! - **PB0**: study LED, active low
//! - **PB1**: break LED, active low

use embassy_stm32::adc::{Adc, AdcChannel, SampleTime};
use embassy_stm32::gpio::{Level, Output, OutputType, Speed};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};

use buddy_core::hal::Board;

use crate::lcd::Hd44780;
use crate::tick::LatchedTick;

mod ladder;
mod lcd_bus;
mod outputs;

pub use ladder::LadderLine;
pub use lcd_bus::GpioLcdBus;
pub use outputs::{PiezoSpeaker, StatusLeds, VibrationMotor};

/// Idle frequency the PWM timer is configured with before the first note.
const PWM_IDLE_HZ: u32 = 440;

/// The concrete peripheral set driven by the session task.
pub type StudyBoard = Board<
    LatchedTick,
    LadderLine<'static>,
    Hd44780<GpioLcdBus<'static>>,
    PiezoSpeaker<'static>,
    VibrationMotor<'static>,
    StatusLeds<'static>,
>;

/// Claims the board's pins and brings every peripheral to its idle state.
///
/// The LCD runs its power-on sequence here, so this blocks for a few
/// milliseconds.
pub fn init_board(p: embassy_stm32::Peripherals) -> StudyBoard {
    let mut adc = Adc::new(p.ADC1);
    adc.set_sample_time(SampleTime::CYCLES160_5);
    let line = LadderLine::new(adc, p.PA0.degrade_adc());

    let display = Hd44780::new(GpioLcdBus::new(
        Output::new(p.PB8, Level::Low, Speed::Low),
        Output::new(p.PB9, Level::Low, Speed::Low),
        [
            Output::new(p.PB4, Level::Low, Speed::Low),
            Output::new(p.PB5, Level::Low, Speed::Low),
            Output::new(p.PB6, Level::Low, Speed::Low),
            Output::new(p.PB7, Level::Low, Speed::Low),
        ],
    ));

    let pwm = SimplePwm::new(
        p.TIM3,
        Some(PwmPin::new(p.PA6, OutputType::PushPull)),
        None,
        None,
        None,
        Hertz::hz(PWM_IDLE_HZ),
        CountingMode::EdgeAlignedUp,
    );

    Board::new(
        LatchedTick::new(),
        line,
        display,
        PiezoSpeaker::new(pwm),
        VibrationMotor::new(Output::new(p.PA7, Level::Low, Speed::Low)),
        // Both LEDs start dark; they are wired active low.
        StatusLeds::new(
            Output::new(p.PB0, Level::High, Speed::Low),
            Output::new(p.PB1, Level::High, Speed::Low),
        ),
    )
}

/// Converts a core duration to the embassy timer's representation.
fn to_embassy(duration: core::time::Duration) -> embassy_time::Duration {
    let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
    embassy_time::Duration::from_micros(micros)
}
