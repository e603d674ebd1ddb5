//! Lux-to-brightness mapping.
//!
//! Pure pipeline from an ambient illuminance reading to an output
//! brightness percentage:
//!
//! ```text
//!   lux ──▶ clamp/linear ──▶ mode inversion ──▶ gamma 2.2 ──▶ percent
//! ```
//!
//! No side effects and no hardware, so the whole pipeline runs on the host.

use crate::config::{Mode, Thresholds};

/// Perceptual gamma exponent.  Fixed, not operator-configurable.
pub const GAMMA: f32 = 2.2;

// ── Error type ────────────────────────────────────────────────

/// Invalid input to the pure mapping.  Unreachable when the configuration
/// store's validation holds, but returned instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    /// `min_lux >= max_lux` (or a NaN threshold) makes the linear map undefined.
    DegenerateRange,
}

impl core::fmt::Display for DomainError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DegenerateRange => write!(f, "lux range is degenerate (min >= max)"),
        }
    }
}

// ── Mapping pipeline ──────────────────────────────────────────

/// Map an illuminance reading to a brightness percentage (0.0 – 100.0).
///
/// Total for every finite `lux`: readings below `min_lux` clamp to 0 %,
/// above `max_lux` to 100 %.  `Night` mode inverts the percentage *before*
/// gamma correction, so the perceptual curve applies to the final value.
pub fn compute_brightness(
    lux: f32,
    thresholds: &Thresholds,
    mode: Mode,
) -> Result<f32, DomainError> {
    let span = thresholds.max_lux - thresholds.min_lux;
    // A NaN span fails this comparison too, so corrupt thresholds land here.
    if !(span > 0.0) {
        return Err(DomainError::DegenerateRange);
    }

    let linear = if lux < thresholds.min_lux {
        0.0
    } else if lux > thresholds.max_lux {
        100.0
    } else {
        (lux - thresholds.min_lux) / span * 100.0
    };

    let directed = match mode {
        Mode::Day => linear,
        Mode::Night => 100.0 - linear,
    };

    Ok(gamma_linearize(directed))
}

/// Perceptual correction: `(p/100)^2.2 * 100`.
///
/// Monotonic on 0–100 with fixed endpoints (`0 → 0`, `100 → 100`).
pub fn gamma_linearize(percent: f32) -> f32 {
    (percent / 100.0).powf(GAMMA) * 100.0
}

/// Scale a brightness percentage onto the 8-bit LEDC duty range.
pub fn percent_to_duty(percent: f32) -> u8 {
    (percent.clamp(0.0, 100.0) / 100.0 * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(min: f32, max: f32) -> Thresholds {
        Thresholds::new(min, max)
    }

    #[test]
    fn below_min_is_fully_off() {
        let th = t(100.0, 1000.0);
        assert_eq!(compute_brightness(100.0, &th, Mode::Day).unwrap(), 0.0);
        assert_eq!(compute_brightness(50.0, &th, Mode::Day).unwrap(), 0.0);
        assert_eq!(compute_brightness(-400.0, &th, Mode::Day).unwrap(), 0.0);
    }

    #[test]
    fn above_max_is_fully_on() {
        let th = t(100.0, 1000.0);
        assert_eq!(compute_brightness(1000.0, &th, Mode::Day).unwrap(), 100.0);
        assert_eq!(compute_brightness(65_535.0, &th, Mode::Day).unwrap(), 100.0);
    }

    #[test]
    fn midpoint_maps_through_gamma() {
        let th = t(0.0, 1000.0);
        let got = compute_brightness(500.0, &th, Mode::Day).unwrap();
        let expected = gamma_linearize(50.0);
        assert!((got - expected).abs() < 1e-4, "got {got}, expected {expected}");
    }

    #[test]
    fn night_mode_inverts_before_gamma() {
        let th = t(0.0, 1000.0);
        // 25 % linear in Night mode must equal gamma(75), not 100 - gamma(25).
        let got = compute_brightness(250.0, &th, Mode::Night).unwrap();
        let inverted_first = gamma_linearize(75.0);
        let inverted_after = 100.0 - gamma_linearize(25.0);
        assert!((got - inverted_first).abs() < 1e-4);
        assert!((got - inverted_after).abs() > 1.0);
    }

    #[test]
    fn night_mode_flips_extremes() {
        let th = t(100.0, 1000.0);
        assert_eq!(compute_brightness(50.0, &th, Mode::Night).unwrap(), 100.0);
        assert_eq!(compute_brightness(2000.0, &th, Mode::Night).unwrap(), 0.0);
    }

    #[test]
    fn gamma_endpoints_are_fixed() {
        assert_eq!(gamma_linearize(0.0), 0.0);
        assert!((gamma_linearize(100.0) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn gamma_is_monotonic() {
        let mut prev = gamma_linearize(0.0);
        for i in 1..=100 {
            let cur = gamma_linearize(i as f32);
            assert!(cur > prev, "gamma not monotonic at {i}");
            prev = cur;
        }
    }

    #[test]
    fn degenerate_range_is_an_error_not_a_panic() {
        let equal = t(500.0, 500.0);
        assert_eq!(
            compute_brightness(600.0, &equal, Mode::Day),
            Err(DomainError::DegenerateRange)
        );
        let inverted = t(1000.0, 100.0);
        assert_eq!(
            compute_brightness(600.0, &inverted, Mode::Day),
            Err(DomainError::DegenerateRange)
        );
        let nan = t(f32::NAN, 1000.0);
        assert_eq!(
            compute_brightness(600.0, &nan, Mode::Day),
            Err(DomainError::DegenerateRange)
        );
    }

    #[test]
    fn percent_to_duty_clamps_and_rounds() {
        assert_eq!(percent_to_duty(0.0), 0);
        assert_eq!(percent_to_duty(100.0), 255);
        assert_eq!(percent_to_duty(50.0), 128);
        assert_eq!(percent_to_duty(-5.0), 0);
        assert_eq!(percent_to_duty(140.0), 255);
    }
}
