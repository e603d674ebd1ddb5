//! GPIO / peripheral pin assignments for the LuxDim driver board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ───────────────────────────────────────────────────────────────
// LED output channels (MOSFET low-side drivers)
// ───────────────────────────────────────────────────────────────

/// LEDC PWM output for LED strip 1.
pub const LED_1_GPIO: i32 = 25;
/// LEDC PWM output for LED strip 2.
/// Both strips are always driven with the same duty cycle.
pub const LED_2_GPIO: i32 = 26;

// ───────────────────────────────────────────────────────────────
// I²C bus (BH1750 illuminance sensor)
// ───────────────────────────────────────────────────────────────

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;

/// BH1750 7-bit I²C address with the ADDR pin tied low.
pub const BH1750_I2C_ADDR: u8 = 0x23;

// ───────────────────────────────────────────────────────────────
// PWM configuration
// ───────────────────────────────────────────────────────────────

/// LEDC base frequency for both LED channels.  The timer runs 8-bit, so
/// duty values span 0..=255.
pub const LED_PWM_FREQ_HZ: u32 = 5_000;
