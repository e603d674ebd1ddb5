//! Dual-channel LED strip PWM driver.
//!
//! Both strips always carry the same duty cycle; they sit on separate
//! LEDC channels only because each MOSFET gate needs its own pin.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes LEDC duty registers via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct LedBank {
    duty: u8,
}

impl LedBank {
    /// Both channels start at duty 0 (hw_init configures them dark).
    pub fn new() -> Self {
        Self { duty: 0 }
    }

    /// Apply one duty value to both strips.
    pub fn set_duty(&mut self, duty: u8) {
        hw_init::ledc_set(hw_init::LEDC_CH_LED_1, duty);
        hw_init::ledc_set(hw_init::LEDC_CH_LED_2, duty);
        self.duty = duty;
    }

    /// Last duty value written to the hardware.
    pub fn duty(&self) -> u8 {
        self.duty
    }
}

impl Default for LedBank {
    fn default() -> Self {
        Self::new()
    }
}
