//! Color vision deficiency simulation.
//!
//! Dichromacy (protan, deutan, tritan) uses the Brettel, Viénot & Mollon
//! (1997) two-half-plane projection in linear RGB, with the precomputed
//! matrices published by DaltonLens for sRGB primaries. Anomalous
//! trichromacy is a linear blend toward the dichromat projection.
//!
//! Monochromacy blends toward a luma value computed on gamma-encoded levels,
//! with no linear-light round trip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::color_space::{from_linear, to_linear};

/// Severity used for the "-anomaly" partial forms
pub const ANOMALY_SEVERITY: f32 = 0.6;

/// A named vision profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deficiency {
    Normal,
    Protanopia,
    Protanomaly,
    Deuteranopia,
    Deuteranomaly,
    Tritanopia,
    Tritanomaly,
    Achromatopsia,
    Achromatomaly,
}

/// The cone response affected by a deficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Protan,
    Deutan,
    Tritan,
    Mono,
}

impl Deficiency {
    pub const ALL: [Deficiency; 9] = [
        Deficiency::Normal,
        Deficiency::Protanopia,
        Deficiency::Protanomaly,
        Deficiency::Deuteranopia,
        Deficiency::Deuteranomaly,
        Deficiency::Tritanopia,
        Deficiency::Tritanomaly,
        Deficiency::Achromatopsia,
        Deficiency::Achromatomaly,
    ];

    /// Affected axis, `None` for normal vision.
    pub fn axis(self) -> Option<Axis> {
        use Deficiency::*;
        match self {
            Normal => None,
            Protanopia | Protanomaly => Some(Axis::Protan),
            Deuteranopia | Deuteranomaly => Some(Axis::Deutan),
            Tritanopia | Tritanomaly => Some(Axis::Tritan),
            Achromatopsia | Achromatomaly => Some(Axis::Mono),
        }
    }

    /// Severity in 0.0-1.0 (1.0 for full dichromacy or achromatopsia).
    pub fn severity(self) -> f32 {
        use Deficiency::*;
        match self {
            Normal => 0.0,
            Protanopia | Deuteranopia | Tritanopia | Achromatopsia => 1.0,
            Protanomaly | Deuteranomaly | Tritanomaly | Achromatomaly => ANOMALY_SEVERITY,
        }
    }

    fn name(self) -> &'static str {
        use Deficiency::*;
        match self {
            Normal => "normal",
            Protanopia => "protanopia",
            Protanomaly => "protanomaly",
            Deuteranopia => "deuteranopia",
            Deuteranomaly => "deuteranomaly",
            Tritanopia => "tritanopia",
            Tritanomaly => "tritanomaly",
            Achromatopsia => "achromatopsia",
            Achromatomaly => "achromatomaly",
        }
    }
}

impl fmt::Display for Deficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Deficiency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Deficiency::ALL
            .into_iter()
            .find(|d| d.name() == lower)
            .ok_or_else(|| format!("Unknown vision deficiency: {}", s))
    }
}

/// Three linear-light components.
pub type LinearTriple = [f32; 3];

/// Row-major 3x3 matrix.
pub type Matrix3 = [f32; 9];

/// Brettel projection constants for one dichromat axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrettelParams {
    /// Projection used when the color lies on the non-negative side of the plane
    pub rgb_cvd_from_rgb_1: Matrix3,
    /// Projection used on the negative side
    pub rgb_cvd_from_rgb_2: Matrix3,
    pub separation_plane_normal: LinearTriple,
}

pub const PROTAN: BrettelParams = BrettelParams {
    rgb_cvd_from_rgb_1: [
        0.1451, 1.20165, -0.34675, 0.10447, 0.85316, 0.04237, 0.00429, -0.00603, 1.00174,
    ],
    rgb_cvd_from_rgb_2: [
        0.14115, 1.16782, -0.30897, 0.10495, 0.8573, 0.03776, 0.00431, -0.00586, 1.00155,
    ],
    separation_plane_normal: [0.00048, 0.00416, -0.00464],
};

pub const DEUTAN: BrettelParams = BrettelParams {
    rgb_cvd_from_rgb_1: [
        0.36198, 0.86755, -0.22953, 0.26099, 0.64512, 0.09389, -0.01975, 0.02686, 0.99289,
    ],
    rgb_cvd_from_rgb_2: [
        0.37009, 0.8854, -0.25549, 0.25767, 0.63782, 0.10451, -0.0195, 0.02741, 0.99209,
    ],
    separation_plane_normal: [-0.00293, -0.00645, 0.00938],
};

pub const TRITAN: BrettelParams = BrettelParams {
    rgb_cvd_from_rgb_1: [
        1.01354, 0.14268, -0.15622, -0.01181, 0.87561, 0.13619, 0.07707, 0.81208, 0.11085,
    ],
    rgb_cvd_from_rgb_2: [
        0.93337, 0.19999, -0.13336, 0.05809, 0.82565, 0.11626, -0.37923, 1.13825, 0.24098,
    ],
    separation_plane_normal: [0.0396, -0.02831, -0.01129],
};

impl Axis {
    /// Brettel constants, `None` for monochromacy.
    pub fn brettel_params(self) -> Option<&'static BrettelParams> {
        match self {
            Axis::Protan => Some(&PROTAN),
            Axis::Deutan => Some(&DEUTAN),
            Axis::Tritan => Some(&TRITAN),
            Axis::Mono => None,
        }
    }
}

#[inline]
fn dot(a: &LinearTriple, b: &LinearTriple) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn mul(m: &Matrix3, v: &LinearTriple) -> LinearTriple {
    [
        m[0] * v[0] + m[1] * v[1] + m[2] * v[2],
        m[3] * v[0] + m[4] * v[1] + m[5] * v[2],
        m[6] * v[0] + m[7] * v[1] + m[8] * v[2],
    ]
}

/// Full dichromat projection of a linear-light triple.
pub fn brettel_project(rgb: LinearTriple, params: &BrettelParams) -> LinearTriple {
    let m = if dot(&rgb, &params.separation_plane_normal) >= 0.0 {
        &params.rgb_cvd_from_rgb_1
    } else {
        &params.rgb_cvd_from_rgb_2
    };
    mul(m, &rgb)
}

fn brettel(color: Color, params: &BrettelParams, severity: f32) -> Color {
    let rgb = to_linear(&color);
    let cvd = brettel_project(rgb, params);

    // Linear in RGB, so blending here equals blending in LMS
    let blended: LinearTriple =
        std::array::from_fn(|i| cvd[i] * severity + rgb[i] * (1.0 - severity));

    from_linear(blended)
}

fn monochrome(color: Color, severity: f32) -> Color {
    let [r, g, b] = color.levels();
    let z = r * 0.299 + g * 0.587 + b * 0.114;
    let blend = |c: f32| (z * severity + c * (1.0 - severity)) / 255.0;
    Color::from_clamped(blend(r), blend(g), blend(b))
}

/// Simulate how a color appears under the given vision profile.
///
/// # Example
///
/// ```
/// use cvd_palette::color::Color;
/// use cvd_palette::cvd::{Deficiency, simulate};
///
/// let red = Color::from_u8(255, 0, 0);
/// assert_eq!(simulate(red, Deficiency::Normal), red);
/// assert_eq!(simulate(red, Deficiency::Protanopia).to_u8(), [106, 91, 14]);
/// ```
pub fn simulate(color: Color, deficiency: Deficiency) -> Color {
    match deficiency.axis() {
        None => color,
        Some(axis) => simulate_axis(color, axis, deficiency.severity()),
    }
}

/// Simulate an axis at an arbitrary severity (clamped to 0.0-1.0).
///
/// Severity 0.0 returns the input unchanged.
pub fn simulate_axis(color: Color, axis: Axis, severity: f32) -> Color {
    let severity = if severity.is_finite() {
        severity.clamp(0.0, 1.0)
    } else {
        1.0
    };
    if severity == 0.0 {
        return color;
    }
    match axis.brettel_params() {
        Some(params) => brettel(color, params, severity),
        None => monochrome(color, severity),
    }
}
