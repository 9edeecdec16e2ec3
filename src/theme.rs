//! Built-in light and dark themes.
//!
//! Each theme pairs a main background with a catalog of brand colors to use
//! as optimization targets. Colors from the Sourcegraph brand guidelines
//! (secondary palette, which includes the primary colors).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Brand color rows with enough saturation to serve as targets, lightest to darkest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandRow {
    Light,
    Medium,
    Dark,
}

impl BrandRow {
    /// The seven hues of a row: yellow, red, pink, violet, blue-violet, blue, green.
    pub fn colors(self) -> [Color; 7] {
        match self {
            BrandRow::Light => [
                Color::from_u8(0xff, 0xdb, 0x45), // lemon
                Color::from_u8(0xff, 0x55, 0x43), // vermillion
                Color::from_u8(0xd6, 0x26, 0x87), // cerise
                Color::from_u8(0xa1, 0x12, 0xff), // vivid violet
                Color::from_u8(0x6b, 0x59, 0xed), // plum
                Color::from_u8(0x00, 0xcb, 0xec), // sky blue
                Color::from_u8(0x8f, 0xed, 0xcf), // mint
            ],
            BrandRow::Medium => [
                Color::from_u8(0xff, 0xc2, 0x47), // orange
                Color::from_u8(0xed, 0x2e, 0x20), // pomegranate
                Color::from_u8(0xc4, 0x14, 0x7d), // red violet
                Color::from_u8(0x82, 0x0d, 0xde), // electric violet
                Color::from_u8(0x50, 0x33, 0xe1), // blurple
                Color::from_u8(0x00, 0xa1, 0xc7), // pacific blue
                Color::from_u8(0x17, 0xab, 0x52), // mountain meadow
            ],
            BrandRow::Dark => [
                Color::from_u8(0xff, 0x99, 0x33), // carrot
                Color::from_u8(0xc2, 0x26, 0x26), // poppy
                Color::from_u8(0x9e, 0x17, 0x69), // disco
                Color::from_u8(0x61, 0x12, 0xa3), // seance
                Color::from_u8(0x38, 0x26, 0xcc), // persian blue
                Color::from_u8(0x00, 0x54, 0x82), // orient
                Color::from_u8(0x1f, 0x7d, 0x45), // eucalyptus
            ],
        }
    }
}

/// UI theme selecting a background and brand rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn background(self) -> Color {
        match self {
            Theme::Light => Color::from_u8(0xff, 0xff, 0xff),
            Theme::Dark => Color::from_u8(0x1d, 0x21, 0x2f),
        }
    }

    /// Rows with enough contrast against this theme's background.
    pub fn brand_rows(self) -> [BrandRow; 2] {
        match self {
            Theme::Light => [BrandRow::Medium, BrandRow::Dark],
            Theme::Dark => [BrandRow::Light, BrandRow::Medium],
        }
    }

    /// Target catalog for this theme, row by row.
    pub fn brand_colors(self) -> Vec<Color> {
        self.brand_rows()
            .into_iter()
            .flat_map(BrandRow::colors)
            .collect()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hex_colors;

    #[test]
    fn light_theme_catalog() {
        let hexes = hex_colors(&Theme::Light.brand_colors());
        insta::assert_snapshot!(hexes.join(" "), @"#ffc247 #ed2e20 #c4147d #820dde #5033e1 #00a1c7 #17ab52 #ff9933 #c22626 #9e1769 #6112a3 #3826cc #005482 #1f7d45");
    }

    #[test]
    fn dark_theme_uses_lighter_rows() {
        let colors = Theme::Dark.brand_colors();
        assert_eq!(colors.len(), 14);
        assert_eq!(colors[0].to_hex(), "#ffdb45");
        assert_eq!(Theme::Dark.background().to_hex(), "#1d212f");
    }
}
