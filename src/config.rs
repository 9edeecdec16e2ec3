//! TOML configuration file support, layered with CLI overrides.

use std::path::Path;

use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::annealer::AnnealConfig;
use crate::color::{Color, parse_color};
use crate::cost::CostWeights;
use crate::error::PaletteError;
use crate::theme::Theme;

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading/writing file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
    /// TOML serialization error
    Serialize(toml::ser::Error),
    /// Layered extraction error
    Figment(Box<figment::Error>),
    /// Invalid color format
    InvalidColor(String),
    /// Values that parse but cannot drive a run
    Invalid(PaletteError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse(e) => write!(f, "TOML parse error: {}", e),
            Self::Serialize(e) => write!(f, "TOML serialize error: {}", e),
            Self::Figment(e) => write!(f, "Configuration error: {}", e),
            Self::InvalidColor(s) => write!(f, "Invalid color: {}", s),
            Self::Invalid(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialize(e)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Figment(Box::new(e))
    }
}

impl From<PaletteError> for ConfigError {
    fn from(e: PaletteError) -> Self {
        match e {
            PaletteError::InvalidColor(s) => Self::InvalidColor(s),
            other => Self::Invalid(other),
        }
    }
}

/// Root configuration structure for TOML files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Palette inputs
    pub palette: PaletteSettings,
    /// Cooling schedule
    pub anneal: AnnealConfig,
    /// Cost term weights
    pub weights: CostWeights,
}

/// Palette inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSettings {
    /// Number of colors (defaults to the number of targets)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Theme supplying the default background and targets
    pub theme: Theme,
    /// Background color (any CSS color format), overrides the theme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Target colors (any CSS color format), override the theme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
    /// RNG seed; fresh entropy when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Independent chains to run, keeping the cheapest
    pub runs: usize,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            size: None,
            theme: Theme::default(),
            background: None,
            targets: None,
            seed: None,
            runs: 1,
        }
    }
}

/// Fully parsed inputs for a run.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub size: usize,
    pub background: Color,
    pub targets: Vec<Color>,
    pub seed: Option<u64>,
    pub runs: usize,
    pub anneal: AnnealConfig,
    pub weights: CostWeights,
}

/// Sparse overrides, typically from CLI flags.
///
/// Unset fields are skipped when serialized so they do not mask values from
/// lower layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    pub palette: PaletteOverrides,
    pub anneal: AnnealOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PaletteOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runs: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnealOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooling_rate: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<f32>,
}

impl PaletteConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Merge defaults, an optional TOML file and overrides, later layers winning.
    pub fn layered(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(PaletteConfig::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", path.display()),
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        let config = figment.merge(Serialized::defaults(overrides)).extract()?;
        Ok(config)
    }

    /// Parse colors and fill in theme defaults.
    ///
    /// Uses the theme's background and brand catalog for anything unspecified.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let theme = self.palette.theme;

        let background = match &self.palette.background {
            Some(s) => parse_color(s)?,
            None => theme.background(),
        };

        let targets = match &self.palette.targets {
            Some(list) => list
                .iter()
                .map(|s| parse_color(s))
                .collect::<Result<Vec<_>, _>>()?,
            None => theme.brand_colors(),
        };
        if targets.is_empty() {
            return Err(ConfigError::Invalid(PaletteError::EmptyTargets));
        }

        let size = self.palette.size.unwrap_or(targets.len());
        if size == 0 {
            return Err(ConfigError::Invalid(PaletteError::EmptyPalette));
        }

        self.anneal.validate()?;

        Ok(ResolvedConfig {
            size,
            background,
            targets,
            seed: self.palette.seed,
            runs: self.palette.runs.max(1),
            anneal: self.anneal.clone(),
            weights: self.weights.clone(),
        })
    }
}
