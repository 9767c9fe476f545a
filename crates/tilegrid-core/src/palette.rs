//! Pure value-to-color mapping helpers.
//!
//! These functions are deterministic, stateless, and independent of any
//! device session. Bucket selection is first-match-wins over ascending
//! thresholds, with the final "extreme" bucket catching everything above
//! the last threshold.

use tilegrid_types::Rgb;

/// Cold bucket, below 15 °C.
pub const TEMP_COLD: Rgb = Rgb::new(0, 102, 255);
/// Cool bucket, 15 to 20 °C.
pub const TEMP_COOL: Rgb = Rgb::new(0, 255, 255);
/// Mild bucket, 20 to 25 °C.
pub const TEMP_MILD: Rgb = Rgb::new(255, 255, 0);
/// Warm bucket, 25 to 30 °C.
pub const TEMP_WARM: Rgb = Rgb::new(255, 165, 0);
/// Hot bucket, 30 °C and above.
pub const TEMP_HOT: Rgb = Rgb::new(255, 0, 0);

/// Low UV, index below 3.
pub const UV_LOW: Rgb = Rgb::new(0, 200, 0);
/// Moderate UV, index 3 to 6.
pub const UV_MODERATE: Rgb = Rgb::new(255, 255, 0);
/// High UV, index 6 to 8.
pub const UV_HIGH: Rgb = Rgb::new(255, 165, 0);
/// Very high UV, index 8 to 11.
pub const UV_VERY_HIGH: Rgb = Rgb::new(255, 0, 0);
/// Extreme UV, index 11 and above.
pub const UV_EXTREME: Rgb = Rgb::new(148, 0, 211);

/// Map a temperature in degrees Celsius to one of five attention colors.
///
/// Boundaries at 15, 20, 25 and 30 °C; the attention ordering is
/// blue → cyan → yellow → orange → red as the temperature rises.
#[must_use]
pub fn temp_to_color(temperature: f64) -> Rgb {
    if temperature < 15.0 {
        TEMP_COLD
    } else if temperature < 20.0 {
        TEMP_COOL
    } else if temperature < 25.0 {
        TEMP_MILD
    } else if temperature < 30.0 {
        TEMP_WARM
    } else {
        TEMP_HOT
    }
}

/// Map a UV index to one of five attention colors.
///
/// Boundaries at 3, 6, 8 and 11, matching the WHO UV index scale:
/// green → yellow → orange → red → violet.
#[must_use]
pub fn uv_to_color(uv_index: f64) -> Rgb {
    if uv_index < 3.0 {
        UV_LOW
    } else if uv_index < 6.0 {
        UV_MODERATE
    } else if uv_index < 8.0 {
        UV_HIGH
    } else if uv_index < 11.0 {
        UV_VERY_HIGH
    } else {
        UV_EXTREME
    }
}

/// Linearly rescale `value` from `[min, max]` to `[0, 100]`, clamped.
///
/// The midpoint of the range maps to exactly 50. A degenerate range
/// (`max <= min`) yields 0.
#[must_use]
pub fn normalize_value(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 0.0;
    }
    ((value - min) / (max - min) * 100.0).clamp(0.0, 100.0)
}

/// Linearly interpolate between two colors.
///
/// Each channel is interpolated independently and rounded to the nearest
/// integer; `factor` 0 returns `a` and `factor` 1 returns `b`.
#[must_use]
pub fn interpolate_color(a: Rgb, b: Rgb, factor: f64) -> Rgb {
    let channel = |from: u8, to: u8| -> u8 {
        (f64::from(from) + (f64::from(to) - f64::from(from)) * factor)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgb::new(
        channel(a.r, b.r),
        channel(a.g, b.g),
        channel(a.b, b.b),
    )
}
