//! Color-blind safe categorical palette optimization.
//!
//! Given a background and a catalog of target colors, [`annealer`] searches
//! for a palette whose colors stay far apart (CIEDE2000) from each other and
//! from the background under normal vision and simulated protanopia,
//! deuteranopia and tritanopia, while staying close to the targets.
//!
//! ```
//! use cvd_palette::annealer::{AnnealConfig, Annealer};
//! use cvd_palette::theme::Theme;
//!
//! let theme = Theme::Dark;
//! let targets = theme.brand_colors();
//! let report = Annealer::seeded(1)
//!     .with_config(AnnealConfig {
//!         cooling_rate: 0.5,
//!         ..AnnealConfig::default()
//!     })
//!     .optimize(4, theme.background(), &targets)
//!     .unwrap();
//! assert_eq!(report.final_palette.len(), 4);
//! ```

pub mod annealer;
pub mod cli;
pub mod color;
pub mod color_space;
pub mod config;
pub mod contrast;
pub mod cost;
pub mod cvd;
pub mod error;
pub mod logging;
pub mod theme;

pub use annealer::{AnnealConfig, AnnealReport, Annealer, optimize};
pub use color::Color;
pub use cost::{CostBreakdown, CostEvaluator, CostWeights, score};
pub use cvd::{Deficiency, simulate};
pub use error::{PaletteError, Result};
