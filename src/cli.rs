//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::Level;

use crate::config::{AnnealOverrides, ConfigOverrides, PaletteOverrides};
use crate::theme::Theme;

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format (default)
    #[default]
    Yaml,
    /// JSON format
    Json,
}

/// CLI-compatible theme enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    /// White background, medium and dark brand colors
    Light,
    /// Dark background, light and medium brand colors
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

/// Color-blind safe categorical palette optimizer.
///
/// Starts from a catalog of target colors and anneals toward a palette that
/// stays distinguishable under normal vision, protanopia, deuteranopia and
/// tritanopia.
#[derive(Parser, Debug)]
#[command(name = "cvd-palette")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of palette colors (default: number of targets)
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Theme providing the default background and target colors
    #[arg(short, long, value_enum)]
    pub theme: Option<ThemeArg>,

    /// Background color in any CSS format (hex, rgb(), hsl(), named)
    #[arg(
        short,
        long,
        value_parser = |s: &str| s.parse::<csscolorparser::Color>().map(|_| s.to_string()).map_err(|e| e.to_string())
    )]
    pub background: Option<String>,

    /// Target color; repeat for each catalog entry
    #[arg(
        long = "target",
        value_name = "COLOR",
        value_parser = |s: &str| s.parse::<csscolorparser::Color>().map(|_| s.to_string()).map_err(|e| e.to_string())
    )]
    pub targets: Vec<String>,

    /// RNG seed for reproducible runs
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Independent chains to run in parallel, keeping the cheapest result
    #[arg(long)]
    pub runs: Option<usize>,

    /// Starting temperature
    #[arg(long)]
    pub initial_temperature: Option<f32>,

    /// Temperature multiplier per sweep, in (0, 1)
    #[arg(long)]
    pub cooling_rate: Option<f32>,

    /// Temperature at which annealing stops
    #[arg(long)]
    pub cutoff: Option<f32>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: yaml or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Load configuration from TOML file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save the merged configuration to TOML file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Log file path (default: cvd-palette.log)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, value_name = "LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Cli {
    /// Flags that were set on the command line, for layering over a config file.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            palette: PaletteOverrides {
                size: self.size,
                theme: self.theme.map(Into::into),
                background: self.background.clone(),
                targets: (!self.targets.is_empty()).then(|| self.targets.clone()),
                seed: self.seed,
                runs: self.runs,
            },
            anneal: AnnealOverrides {
                initial_temperature: self.initial_temperature,
                cooling_rate: self.cooling_rate,
                cutoff: self.cutoff,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_targets_collect_in_order() {
        let cli = Cli::parse_from([
            "cvd-palette",
            "--target",
            "#ff0000",
            "--target",
            "blue",
            "--seed",
            "9",
        ]);
        let overrides = cli.to_config_overrides();
        assert_eq!(
            overrides.palette.targets,
            Some(vec!["#ff0000".to_string(), "blue".to_string()])
        );
        assert_eq!(overrides.palette.seed, Some(9));
        assert!(overrides.palette.background.is_none());
    }

    #[test]
    fn log_level_parses_case_insensitively() {
        let cli = Cli::parse_from(["cvd-palette", "--log-level", "Debug"]);
        assert_eq!(cli.log_level, Level::DEBUG);
        assert_eq!(Cli::parse_from(["cvd-palette"]).log_level, Level::INFO);
        assert!(Cli::try_parse_from(["cvd-palette", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn rejects_invalid_background() {
        assert!(Cli::try_parse_from(["cvd-palette", "--background", "nope"]).is_err());
    }
}
