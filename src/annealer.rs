//! Single-coordinate simulated annealing over palettes.
//!
//! Each outer iteration sweeps the palette once. For every slot a proposal is
//! built on an independent copy of the current palette with one channel of
//! that slot nudged; the proposal replaces the current palette with the
//! Metropolis probability `exp(-delta / T)`. The temperature is multiplied by
//! the cooling rate after every sweep and the run stops once it falls to the
//! cutoff. The chain's last state is returned, not the best state visited.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::color::{Channel, Color};
use crate::cost::{CostBreakdown, CostEvaluator, CostWeights};
use crate::error::{PaletteError, Result};

/// Outer iterations between progress log lines
const PROGRESS_INTERVAL: usize = 100;

/// Cooling schedule and move size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealConfig {
    pub initial_temperature: f32,
    /// Multiplier applied to the temperature after each sweep, in (0, 1)
    pub cooling_rate: f32,
    /// The run ends once the temperature is at or below this value
    pub cutoff: f32,
    /// Maximum per-move channel change on the normalized 0.0-1.0 scale
    pub wiggle: f32,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            cooling_rate: 0.99,
            cutoff: 0.0001,
            wiggle: 0.05,
        }
    }
}

impl AnnealConfig {
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(PaletteError::InvalidSchedule(msg));
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return bad(format!(
                "initial temperature must be positive, got {}",
                self.initial_temperature
            ));
        }
        // Below f32::MIN_POSITIVE the cooling product can round back to itself
        if !(self.cutoff.is_finite() && self.cutoff >= f32::MIN_POSITIVE) {
            return bad(format!(
                "cutoff must be at least {:e}, got {:e}",
                f32::MIN_POSITIVE,
                self.cutoff
            ));
        }
        if self.cutoff >= self.initial_temperature {
            return bad(format!(
                "cutoff {} must be below initial temperature {}",
                self.cutoff, self.initial_temperature
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return bad(format!(
                "cooling rate must be in (0, 1), got {}",
                self.cooling_rate
            ));
        }
        if !(self.wiggle > 0.0 && self.wiggle <= 1.0) {
            return bad(format!("wiggle must be in (0, 1], got {}", self.wiggle));
        }
        Ok(())
    }

    /// Number of outer iterations the schedule runs for, 0 if it is invalid.
    pub fn expected_iterations(&self) -> usize {
        if self.validate().is_err() {
            return 0;
        }
        let mut t = self.initial_temperature;
        let mut n = 0;
        while t > self.cutoff {
            t *= self.cooling_rate;
            n += 1;
        }
        n
    }
}

/// Outcome of one annealing run.
#[derive(Debug, Clone)]
pub struct AnnealReport {
    pub start_palette: Vec<Color>,
    pub final_palette: Vec<Color>,
    pub start_cost: CostBreakdown,
    pub final_cost: CostBreakdown,
    pub weights: CostWeights,
    /// Outer iterations (full sweeps) performed
    pub iterations: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub elapsed: Duration,
}

impl AnnealReport {
    pub fn start_total(&self) -> f32 {
        self.start_cost.total(&self.weights)
    }

    pub fn final_total(&self) -> f32 {
        self.final_cost.total(&self.weights)
    }
}

/// Metropolis acceptance probability; at least 1.0 for non-worsening moves.
#[inline]
pub fn acceptance_probability(delta: f32, temperature: f32) -> f32 {
    (-delta / temperature).exp()
}

/// Copy of `color` with one random channel moved by up to `wiggle`.
pub fn random_nearby_color<R: Rng + ?Sized>(color: Color, wiggle: f32, rng: &mut R) -> Color {
    let channel = Channel::ALL[rng.gen_range(0..Channel::ALL.len())];
    let old = color.channel(channel);
    let new = (old + rng.gen_range(-wiggle..=wiggle)).clamp(0.0, 1.0);
    color.with_channel(channel, new)
}

/// Starting palette of `n` colors drawn from the targets.
///
/// Takes the first `n` targets, cycling through the catalog when `n` exceeds
/// its length.
pub fn initial_palette(n: usize, targets: &[Color]) -> Result<Vec<Color>> {
    if n == 0 {
        return Err(PaletteError::EmptyPalette);
    }
    if targets.is_empty() {
        return Err(PaletteError::EmptyTargets);
    }
    if n < targets.len() {
        debug!(n, targets = targets.len(), "Truncating target catalog");
    } else if n > targets.len() {
        warn!(
            n,
            targets = targets.len(),
            "Palette larger than target catalog, repeating targets"
        );
    }
    Ok((0..n).map(|i| targets[i % targets.len()]).collect())
}

/// Simulated annealing driver owning its random source.
pub struct Annealer<R: Rng> {
    config: AnnealConfig,
    weights: CostWeights,
    rng: R,
}

impl Annealer<StdRng> {
    /// Reproducible annealer from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Annealer<R> {
    pub fn new(rng: R) -> Self {
        Self {
            config: AnnealConfig::default(),
            weights: CostWeights::default(),
            rng,
        }
    }

    pub fn with_config(mut self, config: AnnealConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    /// Optimize a palette of `n` colors. Runs to completion.
    pub fn optimize(
        &mut self,
        n: usize,
        background: Color,
        targets: &[Color],
    ) -> Result<AnnealReport> {
        let never = AtomicBool::new(false);
        self.optimize_with_cancel(n, background, targets, &never)
    }

    /// Optimize, checking `cancel` once per outer iteration.
    #[cfg_attr(
        debug_assertions,
        instrument(skip(self, background, targets, cancel), fields(targets = targets.len(), background = %background))
    )]
    pub fn optimize_with_cancel(
        &mut self,
        n: usize,
        background: Color,
        targets: &[Color],
        cancel: &AtomicBool,
    ) -> Result<AnnealReport> {
        self.config.validate()?;
        let start_palette = initial_palette(n, targets)?;
        let mut evaluator = CostEvaluator::new(background, targets, self.weights.clone())?;

        let start_cost = evaluator.evaluate(&start_palette)?;
        let mut current = start_palette.clone();
        let mut current_cost = start_cost;
        let mut current_total = start_cost.total(&self.weights);

        let mut temperature = self.config.initial_temperature;
        let mut iterations = 0;
        let mut accepted = 0;
        let mut rejected = 0;
        let start = Instant::now();

        info!(
            n,
            targets = targets.len(),
            background = %background,
            start_cost = current_total,
            expected_iterations = self.config.expected_iterations(),
            "Starting annealing"
        );

        while temperature > self.config.cutoff {
            if cancel.load(Ordering::Relaxed) {
                warn!(iterations, "Annealing cancelled");
                return Err(PaletteError::Cancelled { iterations });
            }

            for i in 0..n {
                let mut proposal = current.clone();
                proposal[i] = random_nearby_color(current[i], self.config.wiggle, &mut self.rng);

                let new_cost = evaluator.evaluate(&proposal)?;
                let new_total = new_cost.total(&self.weights);
                let p = acceptance_probability(new_total - current_total, temperature);

                if self.rng.gen_range(0.0f32..1.0) < p {
                    current = proposal;
                    current_cost = new_cost;
                    current_total = new_total;
                    accepted += 1;
                } else {
                    rejected += 1;
                }
            }

            iterations += 1;
            temperature *= self.config.cooling_rate;

            if iterations % PROGRESS_INTERVAL == 0 {
                debug!(
                    iterations,
                    temperature,
                    cost = current_total,
                    accepted,
                    rejected,
                    "Annealing progress"
                );
            }
        }

        let elapsed = start.elapsed();
        info!(
            iterations,
            accepted,
            rejected,
            final_cost = current_total,
            elapsed_ms = elapsed.as_millis() as u64,
            "Annealing complete"
        );

        Ok(AnnealReport {
            start_palette,
            final_palette: current,
            start_cost,
            final_cost: current_cost,
            weights: self.weights.clone(),
            iterations,
            accepted,
            rejected,
            elapsed,
        })
    }
}

/// Optimize a palette of `n` colors with default schedule and weights.
///
/// # Example
///
/// ```
/// use cvd_palette::annealer::{AnnealConfig, Annealer};
/// use cvd_palette::color::Color;
///
/// let bg = Color::from_u8(48, 51, 70);
/// let targets = [Color::from_u8(255, 194, 71), Color::from_u8(0, 161, 199)];
/// let schedule = AnnealConfig {
///     cooling_rate: 0.5,
///     ..AnnealConfig::default()
/// };
/// let report = Annealer::seeded(7)
///     .with_config(schedule)
///     .optimize(2, bg, &targets)
///     .unwrap();
/// assert_eq!(report.final_palette.len(), 2);
/// ```
pub fn optimize<R: Rng>(
    n: usize,
    background: Color,
    targets: &[Color],
    rng: R,
) -> Result<Vec<Color>> {
    Annealer::new(rng)
        .optimize(n, background, targets)
        .map(|report| report.final_palette)
}

/// Run one independent seeded chain per seed in parallel.
///
/// Results come back in seed order.
pub fn optimize_many(
    seeds: &[u64],
    n: usize,
    background: Color,
    targets: &[Color],
    config: &AnnealConfig,
    weights: &CostWeights,
) -> Vec<Result<AnnealReport>> {
    seeds
        .par_iter()
        .map(|&seed| {
            Annealer::seeded(seed)
                .with_config(config.clone())
                .with_weights(weights.clone())
                .optimize(n, background, targets)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_sweep_count() {
        // ln(1e-4 / 1000) / ln(0.99)
        let n = AnnealConfig::default().expected_iterations();
        assert!((1600..=1608).contains(&n), "got {n}");
    }

    #[test]
    fn subnormal_cutoff_is_rejected() {
        let config = AnnealConfig {
            cutoff: 1e-44,
            ..AnnealConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PaletteError::InvalidSchedule(_))
        ));
        assert_eq!(config.expected_iterations(), 0);
    }

    #[test]
    fn smallest_normal_cutoff_terminates() {
        let config = AnnealConfig {
            cutoff: f32::MIN_POSITIVE,
            cooling_rate: 0.5,
            ..AnnealConfig::default()
        };
        assert!(config.validate().is_ok());
        // log2(1000 / 2^-126) rounds up to 136
        assert_eq!(config.expected_iterations(), 136);
    }

    #[test]
    fn improving_moves_always_accepted() {
        assert!(acceptance_probability(-5.0, 0.001) >= 1.0);
        assert_eq!(acceptance_probability(0.0, 10.0), 1.0);
        assert!(acceptance_probability(5.0, 1.0) < 0.01);
    }

    #[test]
    fn nearby_color_changes_at_most_one_channel() {
        let mut rng = StdRng::seed_from_u64(3);
        let c = Color::from_u8(100, 150, 200);
        for _ in 0..200 {
            let moved = random_nearby_color(c, 0.05, &mut rng);
            let changed = c
                .channels()
                .iter()
                .zip(moved.channels())
                .filter(|(a, b)| **a != *b)
                .count();
            assert!(changed <= 1);
            for (a, b) in c.channels().iter().zip(moved.channels()) {
                assert!((a - b).abs() <= 0.05 + 1e-6);
            }
        }
    }

    #[test]
    fn rejects_bad_schedules() {
        let bad = [
            AnnealConfig {
                cooling_rate: 1.0,
                ..AnnealConfig::default()
            },
            AnnealConfig {
                cooling_rate: 0.0,
                ..AnnealConfig::default()
            },
            AnnealConfig {
                cutoff: 2000.0,
                ..AnnealConfig::default()
            },
            AnnealConfig {
                initial_temperature: f32::NAN,
                ..AnnealConfig::default()
            },
            AnnealConfig {
                wiggle: 0.0,
                ..AnnealConfig::default()
            },
            AnnealConfig {
                cutoff: 1e-44,
                ..AnnealConfig::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }
}
