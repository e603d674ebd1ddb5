//! Wire vocabulary: topics, inbound parsing, and acknowledgment rendering.
//!
//! Everything the operator sees on the broker is defined here, so the
//! payload contract lives in one place.  The parser turns raw topic and
//! payload strings into the [`ControlMessage`] tagged union; the controller
//! never touches wire strings itself.

use core::fmt::Write as _;

use crate::app::commands::{ControlMessage, ModeRequest};
use crate::config::{Mode, Thresholds};

// ───────────────────────────────────────────────────────────────
// Topics
// ───────────────────────────────────────────────────────────────

/// Inbound: `"<min>,<max>"` decimal ASCII threshold update.
pub const TOPIC_THRESHOLDS: &str = "light/thresholds";
/// Inbound: `"day"` | `"night"` | `"swap"` direction update.
pub const TOPIC_DIRECTION: &str = "config/direction";

/// Outbound threshold-update acknowledgments.
pub const TOPIC_LIGHT_SUCCESS: &str = "light/status/success";
pub const TOPIC_LIGHT_ERROR: &str = "light/status/error";
/// Outbound direction-update acknowledgments.
pub const TOPIC_CONFIG_SUCCESS: &str = "config/status/success";
pub const TOPIC_CONFIG_ERROR: &str = "config/status/error";
/// Outbound telemetry, at most one sample per 5 s.
pub const TOPIC_LUX: &str = "light/lux";

// ───────────────────────────────────────────────────────────────
// Error payloads
// ───────────────────────────────────────────────────────────────

pub const ERR_MISSING_THRESHOLD: &str = "Missing a threshold.";
pub const ERR_INVALID_THRESHOLDS: &str =
    "Invalid thresholds received. Thresholds must be positive and minLux must be less than maxLux.";
pub const ERR_THRESHOLDS_SAVE: &str = "Failed to save light thresholds.";
pub const ERR_MODE_SAVE: &str = "Failed to save configuration of the LEDs.";
pub const ERR_UNKNOWN_MESSAGE: &str = "Unknown message.";

// ───────────────────────────────────────────────────────────────
// Parsing
// ───────────────────────────────────────────────────────────────

/// A malformed payload on a recognised topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Threshold payload had fewer than two readable numbers.
    MissingThreshold,
    /// Direction payload was none of `day` / `night` / `swap`.
    UnknownDirective,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingThreshold => write!(f, "missing a threshold token"),
            Self::UnknownDirective => write!(f, "unknown direction directive"),
        }
    }
}

/// Classify an inbound message.
///
/// `None` means the topic is not part of the control surface and the
/// message carries no response obligation.  A recognised topic with a
/// malformed payload yields `Some(Err(..))` so the caller can publish the
/// matching rejection.
pub fn parse_message(topic: &str, payload: &str) -> Option<Result<ControlMessage, ParseError>> {
    match topic {
        TOPIC_THRESHOLDS => Some(parse_thresholds(payload).map(ControlMessage::SetThresholds)),
        TOPIC_DIRECTION => Some(parse_direction(payload).map(ControlMessage::SetMode)),
        _ => None,
    }
}

/// `"<min>,<max>"` with optional whitespace around each number.  Tokens
/// beyond the second are ignored.  A token that does not parse as a float
/// counts as missing, so garbage is never misread as zero.
fn parse_thresholds(payload: &str) -> Result<Thresholds, ParseError> {
    let mut tokens = payload.split(',');
    let min_lux = parse_lux_token(tokens.next())?;
    let max_lux = parse_lux_token(tokens.next())?;
    Ok(Thresholds::new(min_lux, max_lux))
}

fn parse_lux_token(token: Option<&str>) -> Result<f32, ParseError> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .and_then(|t| t.parse::<f32>().ok())
        .ok_or(ParseError::MissingThreshold)
}

/// Exact-match directives, no whitespace tolerance.
fn parse_direction(payload: &str) -> Result<ModeRequest, ParseError> {
    match payload {
        "day" => Ok(ModeRequest::Day),
        "night" => Ok(ModeRequest::Night),
        "swap" => Ok(ModeRequest::Toggle),
        _ => Err(ParseError::UnknownDirective),
    }
}

// ───────────────────────────────────────────────────────────────
// Acknowledgment / telemetry rendering
// ───────────────────────────────────────────────────────────────

/// Success ack for a threshold update.
///
/// Capacity covers two worst-case `f32` renderings; a formatting overflow
/// truncates the ack instead of panicking.
pub fn thresholds_updated_ack(min_lux: f32, max_lux: f32) -> heapless::String<128> {
    let mut s = heapless::String::new();
    let _ = write!(
        s,
        "Thresholds have been updated to {min_lux:.2} - {max_lux:.2} lux."
    );
    s
}

/// Success ack for a direct `day` / `night` set.
pub fn mode_set_ack(mode: Mode) -> &'static str {
    match mode {
        Mode::Day => "Brightness direction has been set to day.",
        Mode::Night => "Brightness direction has been set to night.",
    }
}

/// Success ack for a `swap`, rendering the resulting direction.
pub fn mode_swapped_ack(mode: Mode) -> &'static str {
    match mode {
        Mode::Day => "Brightness direction has been swapped to day.",
        Mode::Night => "Brightness direction has been swapped to night.",
    }
}

/// Telemetry payload for [`TOPIC_LUX`].
pub fn telemetry_message(lux: f32) -> heapless::String<64> {
    let mut s = heapless::String::new();
    let _ = write!(s, "Current lux: {lux:.2} lx.");
    s
}
