use std::sync::atomic::AtomicBool;

use cvd_palette::annealer::{AnnealConfig, Annealer, initial_palette, optimize, optimize_many};
use cvd_palette::color::Color;
use cvd_palette::cost::CostWeights;
use cvd_palette::error::PaletteError;
use cvd_palette::theme::{BrandRow, Theme};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn background() -> Color {
    Color::from_u8(48, 51, 70)
}

fn quick() -> AnnealConfig {
    AnnealConfig {
        cooling_rate: 0.9,
        ..AnnealConfig::default()
    }
}

fn assert_in_gamut(palette: &[Color]) {
    for color in palette {
        for channel in color.channels() {
            assert!(channel.is_finite() && (0.0..=1.0).contains(&channel));
        }
    }
}

#[test]
fn test_single_color_runs_full_schedule() {
    let targets = Theme::Dark.brand_colors();
    let report = Annealer::seeded(11).optimize(1, background(), &targets).unwrap();

    assert_eq!(report.final_palette.len(), 1);
    assert_eq!(report.final_cost.range, 0.0);
    assert_eq!(
        report.iterations,
        AnnealConfig::default().expected_iterations()
    );
    assert_eq!(report.accepted + report.rejected, report.iterations);
    assert_in_gamut(&report.final_palette);
}

#[test]
fn test_proposals_evaluated_once_per_slot() {
    let targets = Theme::Light.brand_colors();
    let report = Annealer::seeded(5)
        .with_config(quick())
        .optimize(4, Theme::Light.background(), &targets)
        .unwrap();
    assert_eq!(report.iterations, quick().expected_iterations());
    assert_eq!(report.accepted + report.rejected, report.iterations * 4);
}

#[test]
fn test_same_seed_same_palette() {
    let targets = Theme::Dark.brand_colors();
    let run = |seed| {
        Annealer::seeded(seed)
            .with_config(quick())
            .optimize(4, background(), &targets)
            .unwrap()
            .final_palette
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn test_start_palette_is_untouched_by_search() {
    let targets = Theme::Dark.brand_colors();
    let report = Annealer::seeded(3)
        .with_config(quick())
        .optimize(5, background(), &targets)
        .unwrap();
    assert_eq!(report.start_palette, targets[..5].to_vec());
    assert_ne!(report.final_palette, report.start_palette);
    assert_in_gamut(&report.final_palette);
}

#[test]
fn test_cold_search_improves_cost() {
    let targets = BrandRow::Light.colors();
    let cold = AnnealConfig {
        initial_temperature: 1.0,
        cooling_rate: 0.95,
        ..AnnealConfig::default()
    };

    let seeds = [1, 2, 3, 4];
    let reports: Vec<_> = seeds
        .iter()
        .map(|&seed| {
            Annealer::seeded(seed)
                .with_config(cold.clone())
                .optimize(6, background(), &targets)
                .unwrap()
        })
        .collect();

    let start: f32 = reports.iter().map(|r| r.start_total()).sum::<f32>() / 4.0;
    let end: f32 = reports.iter().map(|r| r.final_total()).sum::<f32>() / 4.0;
    assert!(end < start, "mean cost rose from {start} to {end}");
}

#[test]
fn test_zero_size_is_rejected() {
    let targets = Theme::Dark.brand_colors();
    let err = Annealer::seeded(1)
        .optimize(0, background(), &targets)
        .unwrap_err();
    assert_eq!(err, PaletteError::EmptyPalette);
}

#[test]
fn test_empty_targets_are_rejected() {
    let err = Annealer::seeded(1).optimize(3, background(), &[]).unwrap_err();
    assert_eq!(err, PaletteError::EmptyTargets);
}

#[test]
fn test_invalid_schedule_is_rejected() {
    let targets = Theme::Dark.brand_colors();
    let err = Annealer::seeded(1)
        .with_config(AnnealConfig {
            cooling_rate: 1.5,
            ..AnnealConfig::default()
        })
        .optimize(3, background(), &targets)
        .unwrap_err();
    assert!(matches!(err, PaletteError::InvalidSchedule(_)));
}

#[test]
fn test_subnormal_cutoff_fails_fast() {
    let targets = Theme::Dark.brand_colors();
    let err = Annealer::seeded(1)
        .with_config(AnnealConfig {
            cutoff: 1e-44,
            ..AnnealConfig::default()
        })
        .optimize(2, background(), &targets)
        .unwrap_err();
    assert!(matches!(err, PaletteError::InvalidSchedule(_)));
}

#[test]
fn test_cancelled_before_first_sweep() {
    let targets = Theme::Dark.brand_colors();
    let cancel = AtomicBool::new(true);
    let err = Annealer::seeded(1)
        .optimize_with_cancel(3, background(), &targets, &cancel)
        .unwrap_err();
    assert_eq!(err, PaletteError::Cancelled { iterations: 0 });
}

#[test]
fn test_initial_palette_truncates_and_cycles() {
    let targets = [
        Color::from_u8(255, 0, 0),
        Color::from_u8(0, 255, 0),
        Color::from_u8(0, 0, 255),
    ];
    assert_eq!(initial_palette(2, &targets).unwrap(), targets[..2].to_vec());
    assert_eq!(
        initial_palette(5, &targets).unwrap(),
        vec![targets[0], targets[1], targets[2], targets[0], targets[1]]
    );
}

#[test]
fn test_palette_larger_than_catalog() {
    let targets = [Color::from_u8(255, 194, 71), Color::from_u8(0, 161, 199)];
    let report = Annealer::seeded(9)
        .with_config(quick())
        .optimize(4, background(), &targets)
        .unwrap();
    assert_eq!(report.final_palette.len(), 4);
    assert_in_gamut(&report.final_palette);
}

#[test]
fn test_free_optimize_returns_palette() {
    let targets = Theme::Light.brand_colors();
    let palette = optimize(
        2,
        Theme::Light.background(),
        &targets,
        StdRng::seed_from_u64(0),
    )
    .unwrap();
    assert_eq!(palette.len(), 2);
    assert_in_gamut(&palette);
}

#[test]
fn test_parallel_runs_match_sequential() {
    let targets = Theme::Dark.brand_colors();
    let config = AnnealConfig {
        cooling_rate: 0.5,
        ..AnnealConfig::default()
    };
    let weights = CostWeights::default();
    let seeds = [7, 8, 9];

    let results = optimize_many(&seeds, 3, background(), &targets, &config, &weights);
    assert_eq!(results.len(), seeds.len());

    for (seed, result) in seeds.iter().zip(results) {
        let sequential = Annealer::seeded(*seed)
            .with_config(config.clone())
            .optimize(3, background(), &targets)
            .unwrap();
        assert_eq!(result.unwrap().final_palette, sequential.final_palette);
    }
}

/// Full default schedule on a 16-color catalog. Slow in debug builds.
#[test]
#[ignore]
fn test_full_schedule_reduces_cost() {
    let mut targets: Vec<Color> = BrandRow::Medium
        .colors()
        .into_iter()
        .chain(BrandRow::Dark.colors())
        .collect();
    targets.push("#82a460".parse().unwrap());
    targets.push("#c3c865".parse().unwrap());
    assert_eq!(targets.len(), 16);

    let seeds: Vec<u64> = (0..4).collect();
    let results = optimize_many(
        &seeds,
        16,
        background(),
        &targets,
        &AnnealConfig::default(),
        &CostWeights::default(),
    );

    let reports: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    let start: f32 = reports.iter().map(|r| r.start_total()).sum::<f32>() / reports.len() as f32;
    let end: f32 = reports.iter().map(|r| r.final_total()).sum::<f32>() / reports.len() as f32;
    assert!(end <= start, "mean cost rose from {start} to {end}");
    for report in &reports {
        assert_eq!(report.final_palette.len(), 16);
        assert_in_gamut(&report.final_palette);
    }
}
