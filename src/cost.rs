//! Multi-objective palette cost.
//!
//! A palette is scored against a background and a catalog of target colors.
//! Lower is better. For each vision profile (normal plus the three full
//! dichromacies) the simulated palette is compared with the simulated
//! background and with itself; separations are pushed toward an ideal
//! CIEDE2000 distance of 100 by an RMS deviation. Uneven spacing and drift
//! away from the nearest target color are penalized separately.

use std::fmt;

use palette::Lab;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::color_space::{lab_distance, to_lab};
use crate::cvd::{Deficiency, simulate};
use crate::error::{PaletteError, Result};

/// Weights for each cost term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Normal-vision separation
    pub energy: f32,
    /// Distance to nearest target color
    pub target: f32,
    /// Spread between largest and smallest mutual distance
    pub range: f32,
    pub protan: f32,
    pub deutan: f32,
    pub tritan: f32,
    /// Share of the profile cost taken by background separation (rest is mutual)
    pub bg_share: f32,
    /// Ideal perceptual separation
    pub ideal_distance: f32,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            energy: 1.0,
            target: 1.0,
            range: 0.5,
            protan: 0.33,
            deutan: 0.33,
            tritan: 0.33,
            bg_share: 0.2,
            ideal_distance: 100.0,
        }
    }
}

/// Every term of one evaluation, before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CostBreakdown {
    pub normal: f32,
    pub protan: f32,
    pub deutan: f32,
    pub tritan: f32,
    pub range: f32,
    pub target: f32,
}

impl CostBreakdown {
    /// Weighted sum of all terms.
    pub fn total(&self, w: &CostWeights) -> f32 {
        w.energy * self.normal
            + w.target * self.target
            + w.range * self.range
            + w.protan * self.protan
            + w.deutan * self.deutan
            + w.tritan * self.tritan
    }
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "distance={:.2}  target={:.2}  range={:.2}  a11y={:.2},{:.2},{:.2}",
            self.normal, self.target, self.range, self.protan, self.deutan, self.tritan
        )
    }
}

/// Root of the mean squared deviation of `xs` from `target`.
///
/// An empty set has no deviation and yields 0.0.
pub fn rms_deviation(target: f32, xs: &[f32]) -> f32 {
    if xs.is_empty() {
        return 0.0;
    }
    let sum: f32 = xs.iter().map(|x| (target - x) * (target - x)).sum();
    (sum / xs.len() as f32).sqrt()
}

/// Largest minus smallest value, 0.0 for an empty set.
pub fn max_minus_min(xs: &[f32]) -> f32 {
    if xs.is_empty() {
        return 0.0;
    }
    let (min, max) = xs
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    max - min
}

#[derive(Debug, Default)]
struct ScratchBuffers {
    labs: Vec<Lab>,
    from_bg: Vec<f32>,
    mutual: Vec<f32>,
    normal_mutual: Vec<f32>,
}

/// Reusable evaluator bound to one background and target catalog.
///
/// Holds scratch buffers so repeated evaluations do not allocate.
#[derive(Debug)]
pub struct CostEvaluator {
    background: Color,
    targets: Vec<Color>,
    target_labs: Vec<Lab>,
    weights: CostWeights,
    bufs: ScratchBuffers,
}

impl CostEvaluator {
    /// Profiles scored by the evaluator, in breakdown order.
    pub const PROFILES: [Deficiency; 4] = [
        Deficiency::Normal,
        Deficiency::Protanopia,
        Deficiency::Deuteranopia,
        Deficiency::Tritanopia,
    ];

    pub fn new(background: Color, targets: &[Color], weights: CostWeights) -> Result<Self> {
        if targets.is_empty() {
            return Err(PaletteError::EmptyTargets);
        }
        Ok(Self {
            background,
            targets: targets.to_vec(),
            target_labs: targets.iter().map(to_lab).collect(),
            weights,
            bufs: ScratchBuffers::default(),
        })
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn targets(&self) -> &[Color] {
        &self.targets
    }

    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    /// Score a palette, returning every term.
    pub fn evaluate(&mut self, palette: &[Color]) -> Result<CostBreakdown> {
        if palette.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }

        let normal = self.profile_cost(palette, Deficiency::Normal);
        // Keep the normal-vision mutual distances for the range term
        std::mem::swap(&mut self.bufs.mutual, &mut self.bufs.normal_mutual);
        let range = max_minus_min(&self.bufs.normal_mutual);

        let protan = self.profile_cost(palette, Deficiency::Protanopia);
        let deutan = self.profile_cost(palette, Deficiency::Deuteranopia);
        let tritan = self.profile_cost(palette, Deficiency::Tritanopia);
        let target = self.target_cost(palette);

        Ok(CostBreakdown {
            normal,
            protan,
            deutan,
            tritan,
            range,
            target,
        })
    }

    /// Weighted total of [`CostEvaluator::evaluate`].
    pub fn score(&mut self, palette: &[Color]) -> Result<f32> {
        let breakdown = self.evaluate(palette)?;
        Ok(breakdown.total(&self.weights))
    }

    /// Separation cost of a palette under one vision profile.
    ///
    /// Leaves the pairwise distances in `bufs.mutual`.
    fn profile_cost(&mut self, palette: &[Color], deficiency: Deficiency) -> f32 {
        let bufs = &mut self.bufs;
        let bg = to_lab(&simulate(self.background, deficiency));

        bufs.labs.clear();
        bufs.labs
            .extend(palette.iter().map(|c| to_lab(&simulate(*c, deficiency))));

        bufs.from_bg.clear();
        bufs.from_bg
            .extend(bufs.labs.iter().map(|lab| lab_distance(bg, *lab)));

        bufs.mutual.clear();
        for i in 0..bufs.labs.len() {
            for j in (i + 1)..bufs.labs.len() {
                bufs.mutual.push(lab_distance(bufs.labs[i], bufs.labs[j]));
            }
        }

        let ideal = self.weights.ideal_distance;
        let bg_share = self.weights.bg_share;
        bg_share * rms_deviation(ideal, &bufs.from_bg)
            + (1.0 - bg_share) * rms_deviation(ideal, &bufs.mutual)
    }

    /// Mean distance from each palette color to its nearest target.
    fn target_cost(&self, palette: &[Color]) -> f32 {
        let total: f32 = palette
            .iter()
            .map(|c| {
                let lab = to_lab(c);
                self.target_labs
                    .iter()
                    .map(|t| lab_distance(lab, *t))
                    .fold(f32::INFINITY, f32::min)
            })
            .sum();
        total / palette.len() as f32
    }
}

/// Score a palette with the default weights.
///
/// # Example
///
/// ```
/// use cvd_palette::color::Color;
/// use cvd_palette::cost::score;
///
/// let bg = Color::from_u8(48, 51, 70);
/// let targets = [Color::from_u8(255, 194, 71), Color::from_u8(0, 161, 199)];
/// let cost = score(&targets, bg, &targets).unwrap();
/// assert!(cost.is_finite() && cost > 0.0);
/// assert!(score(&[], bg, &targets).is_err());
/// ```
pub fn score(palette: &[Color], background: Color, targets: &[Color]) -> Result<f32> {
    CostEvaluator::new(background, targets, CostWeights::default())?.score(palette)
}

/// Closest color in `candidates` by perceptual distance.
pub fn closest_color(color: Color, candidates: &[Color]) -> Option<Color> {
    let lab = to_lab(&color);
    candidates
        .iter()
        .map(|c| (*c, lab_distance(lab, to_lab(c))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rms_deviation_of_constant_set() {
        assert_relative_eq!(rms_deviation(100.0, &[90.0, 110.0]), 10.0);
        assert_eq!(rms_deviation(100.0, &[]), 0.0);
    }

    #[test]
    fn range_of_empty_and_single() {
        assert_eq!(max_minus_min(&[]), 0.0);
        assert_eq!(max_minus_min(&[4.0]), 0.0);
        assert_eq!(max_minus_min(&[4.0, -1.0, 2.5]), 5.0);
    }

    #[test]
    fn evaluator_reuses_buffers_deterministically() {
        let bg = Color::from_u8(255, 255, 255);
        let palette = [
            Color::from_u8(237, 46, 32),
            Color::from_u8(0, 161, 199),
            Color::from_u8(23, 171, 82),
        ];
        let mut eval = CostEvaluator::new(bg, &palette, CostWeights::default()).unwrap();
        let first = eval.evaluate(&palette).unwrap();
        let second = eval.evaluate(&palette).unwrap();
        assert_eq!(first, second);
    }
}
