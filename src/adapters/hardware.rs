//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the light sensor and the LED bank, exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  This is the only module in the
//! system that touches actual hardware.  On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::led_pwm::LedBank;
use crate::sensors::light::Bh1750;

use embedded_hal::i2c::I2c;

/// Concrete adapter that combines all hardware behind port traits.
///
/// Generic over the I²C bus so host tests can drive it with a scripted
/// bus; on target the bus is an `esp-idf-hal` I²C driver.
pub struct HardwareAdapter<I2C: I2c> {
    light: Bh1750<I2C>,
    leds: LedBank,
}

impl<I2C: I2c> HardwareAdapter<I2C> {
    pub fn new(light: Bh1750<I2C>, leds: LedBank) -> Self {
        Self { light, leds }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c> SensorPort for HardwareAdapter<I2C> {
    fn read_lux(&mut self) -> f32 {
        self.light.read_lux()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C: I2c> ActuatorPort for HardwareAdapter<I2C> {
    fn set_duty(&mut self, duty: u8) {
        self.leds.set_duty(duty);
    }
}
