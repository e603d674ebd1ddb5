//! Light controller configuration.
//!
//! Thresholds and the day/night direction mode, together with the NVS
//! namespace layout they persist under.  The on-flash layout is
//! bit-compatible with the Arduino `Preferences` blobs of earlier board
//! revisions, so a reflashed unit keeps its settings.

// ───────────────────────────────────────────────────────────────
// Compiled-in defaults
// ───────────────────────────────────────────────────────────────

/// Lux level at (or below) which the LEDs are fully off in Day mode.
pub const DEFAULT_MIN_LUX: f32 = 100.0;
/// Lux level at (or above) which the LEDs are fully on in Day mode.
pub const DEFAULT_MAX_LUX: f32 = 1000.0;

// ───────────────────────────────────────────────────────────────
// NVS layout
// ───────────────────────────────────────────────────────────────

/// Namespace holding the two threshold floats.
pub const NS_THRESHOLDS: &str = "lightThresholds";
pub const KEY_MIN_LUX: &str = "minLux";
pub const KEY_MAX_LUX: &str = "maxLux";

/// Namespace holding the direction flag.
pub const NS_CONFIG: &str = "config";
pub const KEY_NIGHT_MODE: &str = "isNightMode";

// ───────────────────────────────────────────────────────────────
// Types
// ───────────────────────────────────────────────────────────────

/// Sensitivity window mapping ambient lux onto the 0–100 % brightness range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_lux: f32,
    pub max_lux: f32,
}

impl Thresholds {
    pub const fn new(min_lux: f32, max_lux: f32) -> Self {
        Self { min_lux, max_lux }
    }

    /// Range check: both ends non-negative and strictly ordered.
    ///
    /// A NaN in either field fails every comparison here, so corrupt input
    /// can never pass as valid.
    pub fn is_valid(&self) -> bool {
        self.min_lux >= 0.0 && self.max_lux >= 0.0 && self.min_lux < self.max_lux
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LUX, DEFAULT_MAX_LUX)
    }
}

/// Brightness direction: `Day` brightens with ambient light, `Night` inverts
/// the relationship and dims as the room gets brighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Day,
    Night,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }

    pub fn is_night(self) -> bool {
        matches!(self, Self::Night)
    }

    pub fn from_night_flag(night: bool) -> Self {
        if night { Self::Night } else { Self::Day }
    }

    /// Lower-case wire/ack rendering ("day" / "night").
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
        }
    }
}

/// The complete runtime configuration of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightConfig {
    pub thresholds: Thresholds,
    pub mode: Mode,
}
