//! CLI entry point for cvd-palette.

use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use serde::Serialize;
use tracing::info;

use cvd_palette::annealer::{AnnealReport, optimize_many};
use cvd_palette::cli::{Cli, OutputFormat};
use cvd_palette::color::hex_colors;
use cvd_palette::config::PaletteConfig;
use cvd_palette::contrast::{ContrastNeed, ContrastWarning, check_palette};
use cvd_palette::cost::CostBreakdown;
use cvd_palette::logging::init_logging;

/// Serialized result of a run.
#[derive(Debug, Serialize)]
struct PaletteOutput {
    background: String,
    palette: Vec<String>,
    seed: u64,
    iterations: usize,
    elapsed_ms: u64,
    start_cost: f32,
    final_cost: f32,
    breakdown: CostBreakdown,
    contrast_warnings: Vec<ContrastWarning>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref(), cli.log_level);

    let config = PaletteConfig::layered(cli.config.as_deref(), &cli.to_config_overrides())
        .map_err(|e| eyre!("Failed to load configuration: {}", e))?;

    if let Some(ref path) = cli.save_config {
        config
            .save(path)
            .map_err(|e| eyre!("Failed to save config to {}: {}", path.display(), e))?;
        eprintln!("Saved configuration to {}", path.display());
    }

    let resolved = config
        .resolve()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;

    let base_seed = resolved.seed.unwrap_or_else(rand::random);
    let seeds: Vec<u64> = (0..resolved.runs as u64)
        .map(|i| base_seed.wrapping_add(i))
        .collect();

    info!(
        size = resolved.size,
        targets = resolved.targets.len(),
        runs = seeds.len(),
        base_seed,
        "Optimizing palette"
    );

    let results = optimize_many(
        &seeds,
        resolved.size,
        resolved.background,
        &resolved.targets,
        &resolved.anneal,
        &resolved.weights,
    );

    let mut best: Option<(u64, AnnealReport)> = None;
    for (seed, result) in seeds.iter().zip(results) {
        let report = result.wrap_err_with(|| format!("Optimization failed for seed {seed}"))?;
        eprintln!(
            "seed {seed}: {:.2} -> {:.2} ({})",
            report.start_total(),
            report.final_total(),
            report.final_cost
        );
        let better = best
            .as_ref()
            .is_none_or(|(_, b)| report.final_total() < b.final_total());
        if better {
            best = Some((*seed, report));
        }
    }
    let (seed, report) = best.ok_or_else(|| eyre!("No optimization runs were performed"))?;

    let contrast_warnings = check_palette(
        &report.final_palette,
        resolved.background,
        ContrastNeed::Background,
    );
    for warning in &contrast_warnings {
        eprintln!("Warning: {warning}");
    }

    let output = PaletteOutput {
        background: resolved.background.to_hex(),
        palette: hex_colors(&report.final_palette),
        seed,
        iterations: report.iterations,
        elapsed_ms: duration_ms(report.elapsed),
        start_cost: report.start_total(),
        final_cost: report.final_total(),
        breakdown: report.final_cost,
        contrast_warnings,
    };

    let serialized = match cli.format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(&output).wrap_err("Failed to serialize palette to YAML")?
        }
        OutputFormat::Json => serde_json::to_string_pretty(&output)
            .wrap_err("Failed to serialize palette to JSON")?
            + "\n",
    };

    if let Some(ref path) = cli.output {
        std::fs::write(path, &serialized)
            .wrap_err_with(|| format!("Failed to write to {}", path.display()))?;
        eprintln!("Wrote palette to {}", path.display());
    } else {
        print!("{serialized}");
    }

    Ok(())
}

fn duration_ms(d: Duration) -> u64 {
    d.as_millis().min(u64::MAX as u128) as u64
}
