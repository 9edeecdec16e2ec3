//! Gamma transfer functions and perceptual color difference.
//!
//! The sRGB transfer curve follows IEC 61966-2-1 with the 0.04045 / 0.0031308
//! breakpoints. Perceptual distance is CIEDE2000 on CIE L*a*b* (D65).

use palette::color_difference::Ciede2000;
use palette::{FromColor, Lab, LinSrgb};

use crate::color::Color;

/// Breakpoint on the encoded (normalized) side of the sRGB curve
const ENCODED_BREAK: f32 = 0.04045;
/// Breakpoint on the linear side of the sRGB curve
const LINEAR_BREAK: f32 = 0.0031308;
const SLOPE: f32 = 12.92;
const GAMMA: f32 = 2.4;

/// Convert an 8-bit gamma-encoded level to linear light (0.0-1.0).
#[inline]
pub fn srgb_to_linear(level: u8) -> f32 {
    srgb_to_linear_f32(level as f32 / 255.0)
}

/// Convert a normalized gamma-encoded channel (0.0-1.0) to linear light.
#[inline]
pub fn srgb_to_linear_f32(v: f32) -> f32 {
    if v < ENCODED_BREAK {
        v / SLOPE
    } else {
        ((v + 0.055) / 1.055).powf(GAMMA)
    }
}

/// Convert linear light to a gamma-encoded level on the 0-255 scale.
///
/// Values at or below 0.0 map to 0 and at or above 1.0 map to 255. The
/// linear segment carries a +0.5 offset so that truncating callers round.
#[inline]
pub fn linear_to_srgb(value: f32) -> f32 {
    if value <= 0.0 {
        0.0
    } else if value >= 1.0 {
        255.0
    } else if value < LINEAR_BREAK {
        0.5 + value * SLOPE * 255.0
    } else {
        255.0 * (value.powf(1.0 / GAMMA) * 1.055 - 0.055)
    }
}

/// Exact inverse of [`srgb_to_linear_f32`] on the 0-255 scale.
///
/// Same curve as [`linear_to_srgb`] without the +0.5 offset in the linear
/// segment, so fractional levels can be rounded directly.
#[inline]
fn linear_to_level(value: f32) -> f32 {
    if value < LINEAR_BREAK {
        (linear_to_srgb(value) - 0.5).max(0.0)
    } else {
        linear_to_srgb(value)
    }
}

/// Quantize linear light to the nearest 8-bit level.
#[inline]
pub fn linear_to_srgb_u8(value: f32) -> u8 {
    linear_to_level(value).round().clamp(0.0, 255.0) as u8
}

/// Linear-light channels of a color.
#[inline]
pub fn to_linear(color: &Color) -> [f32; 3] {
    color.channels().map(srgb_to_linear_f32)
}

/// Build a color from linear-light channels.
#[inline]
pub fn from_linear(rgb: [f32; 3]) -> Color {
    let [r, g, b] = rgb.map(linear_to_level);
    Color::from_clamped(r / 255.0, g / 255.0, b / 255.0)
}

/// CIE L*a*b* coordinates of a color.
#[inline]
pub fn to_lab(color: &Color) -> Lab {
    let linear: LinSrgb<f32> = color.srgb().into_linear();
    Lab::from_color(linear)
}

/// CIEDE2000 difference between two precomputed Lab values.
#[inline]
pub fn lab_distance(a: Lab, b: Lab) -> f32 {
    let d = a.difference(b);
    if d.is_finite() { d.max(0.0) } else { 0.0 }
}

/// Perceptual (CIEDE2000) distance between two colors.
///
/// Zero for identical colors; roughly 1.0 is a just-noticeable difference.
///
/// # Example
///
/// ```
/// use cvd_palette::color::Color;
/// use cvd_palette::color_space::distance;
///
/// let black = Color::from_u8(0, 0, 0);
/// let white = Color::from_u8(255, 255, 255);
/// assert_eq!(distance(black, black), 0.0);
/// assert!(distance(black, white) > 90.0);
/// ```
pub fn distance(a: Color, b: Color) -> f32 {
    lab_distance(to_lab(&a), to_lab(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_and_color_paths_agree() {
        for level in 0..=255u8 {
            let [r, _, _] = to_linear(&Color::from_u8(level, 0, 0));
            assert!((srgb_to_linear(level) - r).abs() < 1e-6, "level {level}");
        }
    }

    #[test]
    fn u8_round_trip_is_exact() {
        for level in 0..=255u8 {
            assert_eq!(linear_to_srgb_u8(srgb_to_linear(level)), level);
        }
    }

    #[test]
    fn linear_to_srgb_saturates() {
        assert_eq!(linear_to_srgb(-0.3), 0.0);
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert_eq!(linear_to_srgb(1.0), 255.0);
        assert_eq!(linear_to_srgb(4.0), 255.0);
    }
}
