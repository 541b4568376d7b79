use core::time::Duration;

use embassy_stm32::gpio::Output;
use embassy_stm32::peripherals::TIM3;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_time::Timer;

use buddy_core::feedback::{BUZZ_PATTERN, Note};
use buddy_core::hal::{Indicators, Led, Motor, Speaker};

use super::to_embassy;

const SQUARE_WAVE_DUTY_PERCENT: u8 = 50;

/// Piezo driven by a 50% duty square wave on TIM3 CH1.
pub struct PiezoSpeaker<'d> {
    pwm: SimplePwm<'d, TIM3>,
}

impl<'d> PiezoSpeaker<'d> {
    pub fn new(mut pwm: SimplePwm<'d, TIM3>) -> Self {
        pwm.ch1().disable();
        Self { pwm }
    }
}

impl Speaker for PiezoSpeaker<'_> {
    async fn play_tone(&mut self, note: Note, duration: Duration) {
        self.pwm.set_frequency(Hertz::hz(note.frequency_hz()));
        {
            let mut channel = self.pwm.ch1();
            channel.set_duty_cycle_percent(SQUARE_WAVE_DUTY_PERCENT);
            channel.enable();
        }
        Timer::after(to_embassy(duration)).await;
        self.pwm.ch1().disable();
    }
}

/// Vibration motor behind a low-side driver.
pub struct VibrationMotor<'d> {
    pin: Output<'d>,
}

impl<'d> VibrationMotor<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl Motor for VibrationMotor<'_> {
    async fn buzz(&mut self) {
        for segment in BUZZ_PATTERN {
            if segment.running {
                self.pin.set_high();
            } else {
                self.pin.set_low();
            }
            Timer::after(to_embassy(segment.duration)).await;
        }
        self.pin.set_low();
    }
}

/// Study and break LEDs, both sinking current into the MCU.
pub struct StatusLeds<'d> {
    study: Output<'d>,
    rest: Output<'d>,
}

impl<'d> StatusLeds<'d> {
    pub fn new(study: Output<'d>, rest: Output<'d>) -> Self {
        Self { study, rest }
    }
}

impl Indicators for StatusLeds<'_> {
    fn set(&mut self, led: Led, lit: bool) {
        let pin = match led {
            Led::Study => &mut self.study,
            Led::Break => &mut self.rest,
        };
        if lit {
            pin.set_low();
        } else {
            pin.set_high();
        }
    }
}
