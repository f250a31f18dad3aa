//! Hardware adapter: bridges the raw peripherals set up in
//! [`hw_init`](crate::drivers::hw_init) to the domain ports.
//!
//! On non-espidf targets the underlying calls are simulation stubs.

use log::warn;

use crate::app::ports::{AnalogPort, LightsPort};
use crate::drivers::hw_init;
use crate::pins;

/// ADC1 oneshot reads for the analog sensors.
#[derive(Default)]
pub struct AdcAdapter;

impl AdcAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Map a GPIO to its ADC1 channel.
fn adc1_channel(pin: i32) -> Option<u32> {
    match pin {
        pins::COOLANT_ADC_GPIO => Some(pins::COOLANT_ADC_CHANNEL),
        _ => None,
    }
}

impl AnalogPort for AdcAdapter {
    fn read_analog(&mut self, pin: i32) -> u16 {
        match adc1_channel(pin) {
            Some(channel) => hw_init::adc1_read(channel),
            None => {
                warn!("adc: GPIO{} is not an ADC1 input", pin);
                0
            }
        }
    }
}

/// Auxiliary lights relay on a plain GPIO.
pub struct GpioLights {
    pin: i32,
    on: bool,
}

impl GpioLights {
    /// Lights start off.
    pub fn new(pin: i32) -> Self {
        hw_init::gpio_write(pin, false);
        Self { pin, on: false }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl LightsPort for GpioLights {
    fn set_lights(&mut self, on: bool) {
        hw_init::gpio_write(self.pin, on);
        self.on = on;
    }
}
