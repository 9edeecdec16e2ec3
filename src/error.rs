//! Error type shared by the palette optimizer.

use std::fmt;

/// Errors raised by color construction, cost evaluation and the annealer.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteError {
    /// A channel was non-finite or outside its valid range
    InvalidChannel { channel: &'static str, value: f32 },
    /// A color string could not be parsed
    InvalidColor(String),
    /// Palette size of zero, or an empty palette handed to the evaluator
    EmptyPalette,
    /// The target color catalog is empty
    EmptyTargets,
    /// Annealing schedule parameters are unusable
    InvalidSchedule(String),
    /// The run was cancelled between outer iterations
    Cancelled { iterations: usize },
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel { channel, value } => {
                write!(f, "Invalid {} channel value: {}", channel, value)
            }
            Self::InvalidColor(s) => write!(f, "Invalid color: {}", s),
            Self::EmptyPalette => write!(f, "Palette must contain at least one color"),
            Self::EmptyTargets => write!(f, "Target color catalog must not be empty"),
            Self::InvalidSchedule(s) => write!(f, "Invalid annealing schedule: {}", s),
            Self::Cancelled { iterations } => {
                write!(f, "Optimization cancelled after {} iterations", iterations)
            }
        }
    }
}

impl std::error::Error for PaletteError {}

pub type Result<T> = std::result::Result<T, PaletteError>;
