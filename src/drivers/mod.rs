//! Actuator drivers and hardware initialisation helpers.

pub mod hw_init;
pub mod led_pwm;
