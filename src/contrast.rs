//! WCAG 2.1 contrast ratio diagnostics.
//!
//! Used to report palette entries that fall below a readability floor on the
//! background. Not part of the optimization cost.

use palette::color_difference::Wcag21RelativeContrast;
use serde::Serialize;

use crate::color::Color;

/// What a color pair is used for, deciding its minimum ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContrastNeed {
    /// Adjacent surfaces and non-text UI
    Background,
    /// Body text
    Text,
}

impl ContrastNeed {
    pub fn minimum_ratio(self) -> f32 {
        match self {
            ContrastNeed::Background => 3.0,
            ContrastNeed::Text => 4.5,
        }
    }

    /// Whether the pair meets this need's WCAG floor.
    pub fn is_met(self, a: Color, b: Color) -> bool {
        match self {
            ContrastNeed::Background => a.srgb().has_min_contrast_graphics(b.srgb()),
            ContrastNeed::Text => a.srgb().has_min_contrast_text(b.srgb()),
        }
    }
}

/// Relative luminance (Y) of a color.
pub fn relative_luminance(color: Color) -> f32 {
    color.srgb().relative_luminance().luma
}

/// Contrast ratio between two colors, in 1.0-21.0 regardless of order.
///
/// # Example
///
/// ```
/// use cvd_palette::color::Color;
/// use cvd_palette::contrast::contrast_ratio;
///
/// let black = Color::from_u8(0, 0, 0);
/// let white = Color::from_u8(255, 255, 255);
/// assert!((contrast_ratio(black, white) - 21.0).abs() < 0.01);
/// ```
pub fn contrast_ratio(a: Color, b: Color) -> f32 {
    a.srgb().relative_contrast(b.srgb())
}

/// A palette entry that misses its contrast floor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastWarning {
    pub index: usize,
    pub color: String,
    pub ratio: f32,
    pub minimum: f32,
}

impl std::fmt::Display for ContrastWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "color {} ({}) has contrast {:.2}:1 < {:.1}:1",
            self.index, self.color, self.ratio, self.minimum
        )
    }
}

/// Entries of `palette` whose contrast against `background` is below `need`.
pub fn check_palette(
    palette: &[Color],
    background: Color,
    need: ContrastNeed,
) -> Vec<ContrastWarning> {
    palette
        .iter()
        .enumerate()
        .filter(|(_, color)| !need.is_met(**color, background))
        .map(|(index, &color)| ContrastWarning {
            index,
            color: color.to_hex(),
            ratio: contrast_ratio(color, background),
            minimum: need.minimum_ratio(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ratio_is_symmetric_and_bounded() {
        let a = Color::from_u8(200, 50, 50);
        let b = Color::from_u8(29, 33, 47);
        assert_relative_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
        assert_relative_eq!(contrast_ratio(a, a), 1.0);
    }

    #[test]
    fn luminance_endpoints_and_gray() {
        assert_relative_eq!(relative_luminance(Color::from_u8(0, 0, 0)), 0.0);
        assert_relative_eq!(
            relative_luminance(Color::from_u8(255, 255, 255)),
            1.0,
            epsilon = 1e-5
        );
        // Mid-gray 128 decodes to about 21.6% linear light
        assert_relative_eq!(
            relative_luminance(Color::from_u8(128, 128, 128)),
            0.2159,
            epsilon = 1e-3
        );
    }

    #[test]
    fn floors_follow_need() {
        let white = Color::from_u8(255, 255, 255);
        // #767676 on white is about 4.54:1, #949494 about 3.03:1
        let text_gray = Color::from_u8(0x76, 0x76, 0x76);
        let ui_gray = Color::from_u8(0x94, 0x94, 0x94);
        assert!(ContrastNeed::Text.is_met(text_gray, white));
        assert!(!ContrastNeed::Text.is_met(ui_gray, white));
        assert!(ContrastNeed::Background.is_met(ui_gray, white));
        assert!(check_palette(&[ui_gray], white, ContrastNeed::Background).is_empty());
        assert_eq!(check_palette(&[ui_gray], white, ContrastNeed::Text).len(), 1);
    }

    #[test]
    fn flags_low_contrast_entries() {
        let white = Color::from_u8(255, 255, 255);
        let palette = [Color::from_u8(0, 0, 0), Color::from_u8(250, 250, 250)];
        let warnings = check_palette(&palette, white, ContrastNeed::Text);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].index, 1);
        assert_eq!(warnings[0].color, "#fafafa");
    }
}
