use embassy_stm32::adc::{Adc, AnyAdcChannel};
use embassy_stm32::peripherals::ADC1;

use buddy_core::hal::AnalogLine;

/// Resistor-ladder input sampled with single blocking conversions.
pub struct LadderLine<'d> {
    adc: Adc<'d, ADC1>,
    channel: AnyAdcChannel<ADC1>,
}

impl<'d> LadderLine<'d> {
    pub fn new(adc: Adc<'d, ADC1>, channel: AnyAdcChannel<ADC1>) -> Self {
        Self { adc, channel }
    }
}

impl AnalogLine for LadderLine<'_> {
    fn sample(&mut self) -> u16 {
        self.adc.blocking_read(&mut self.channel)
    }
}
