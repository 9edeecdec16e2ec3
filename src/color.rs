//! Immutable sRGB color value.
//!
//! Channels are stored gamma-encoded on the normalized 0.0-1.0 scale. Every
//! transformation returns a new `Color`; nothing mutates in place.

use std::fmt;
use std::str::FromStr;

use csscolorparser::Color as CssColor;
use palette::Srgb;

use crate::error::{PaletteError, Result};

/// One of the three sRGB channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];
}

/// A gamma-encoded sRGB color with channels in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(Srgb<f32>);

impl Color {
    /// Create a color from normalized channels, rejecting anything outside 0.0-1.0.
    pub fn new(red: f32, green: f32, blue: f32) -> Result<Self> {
        check_channel("red", red, 1.0)?;
        check_channel("green", green, 1.0)?;
        check_channel("blue", blue, 1.0)?;
        Ok(Self(Srgb::new(red, green, blue)))
    }

    /// Create a color from 0-255 channel levels given as floats.
    pub fn from_levels(red: f32, green: f32, blue: f32) -> Result<Self> {
        check_channel("red", red, 255.0)?;
        check_channel("green", green, 255.0)?;
        check_channel("blue", blue, 255.0)?;
        Ok(Self(Srgb::new(red / 255.0, green / 255.0, blue / 255.0)))
    }

    /// Create a color from 8-bit channel levels.
    pub fn from_u8(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue).into_format())
    }

    /// Clamp arbitrary normalized channels into gamut.
    ///
    /// Non-finite inputs collapse to 0.0.
    pub(crate) fn from_clamped(red: f32, green: f32, blue: f32) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self(Srgb::new(clamp(red), clamp(green), clamp(blue)))
    }

    /// Normalized channels as an array.
    pub fn channels(&self) -> [f32; 3] {
        [self.0.red, self.0.green, self.0.blue]
    }

    /// Channels as 0-255 levels, without quantization.
    pub fn levels(&self) -> [f32; 3] {
        self.channels().map(|c| c * 255.0)
    }

    /// Normalized value of one channel.
    pub fn channel(&self, channel: Channel) -> f32 {
        self.channels()[channel as usize]
    }

    /// Return a copy with one normalized channel replaced (clamped to 0.0-1.0).
    pub fn with_channel(&self, channel: Channel, value: f32) -> Self {
        let mut channels = self.channels();
        channels[channel as usize] = value;
        Self::from_clamped(channels[0], channels[1], channels[2])
    }

    /// Quantize to 8-bit levels, rounding to the nearest level.
    pub fn to_u8(&self) -> [u8; 3] {
        self.levels().map(|l| l.round().clamp(0.0, 255.0) as u8)
    }

    /// Render as `#rrggbb` for display.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_u8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// The underlying palette color.
    pub fn srgb(&self) -> Srgb<f32> {
        self.0
    }
}

fn check_channel(channel: &'static str, value: f32, max: f32) -> Result<()> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(PaletteError::InvalidChannel { channel, value })
    }
}

impl From<Srgb<u8>> for Color {
    fn from(c: Srgb<u8>) -> Self {
        Self::from_u8(c.red, c.green, c.blue)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self> {
        parse_color(s)
    }
}

/// Parse any CSS color string (hex, rgb(), hsl(), named) into a `Color`.
///
/// Alpha is ignored. Hex strings without the leading `#` are accepted.
///
/// # Example
///
/// ```
/// use cvd_palette::color::parse_color;
///
/// let c = parse_color("#303346").unwrap();
/// assert_eq!(c.to_u8(), [48, 51, 70]);
/// assert_eq!(parse_color("303346").unwrap(), c);
/// ```
pub fn parse_color(s: &str) -> Result<Color> {
    let trimmed = s.trim();
    let css = CssColor::from_str(trimmed)
        .or_else(|_| CssColor::from_str(&format!("#{}", trimmed)))
        .map_err(|e| PaletteError::InvalidColor(format!("'{}': {}", s, e)))?;
    let [r, g, b, _] = css.to_rgba8();
    Ok(Color::from_u8(r, g, b))
}

/// Hex strings for a slice of colors.
pub fn hex_colors(colors: &[Color]) -> Vec<String> {
    colors.iter().map(Color::to_hex).collect()
}
