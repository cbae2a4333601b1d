use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::keywords::KeywordSet;

/// Row tolerance for a single extraction pass.
pub const DEFAULT_ROW_TOLERANCE: f64 = 16.0;
pub const DEFAULT_COLUMN_TOLERANCE: f64 = 150.0;
/// Row tolerances tried in order until a pass yields items.
pub const DEFAULT_ROW_TOLERANCES: [f64; 4] = [5.0, 10.0, 15.0, 20.0];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for receipt extraction, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub row_tolerances: Vec<f64>,
    pub column_tolerance: f64,
    pub keywords: KeywordSet,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            row_tolerances: DEFAULT_ROW_TOLERANCES.to_vec(),
            column_tolerance: DEFAULT_COLUMN_TOLERANCE,
            keywords: KeywordSet::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ExtractionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Replace the retry sequence with a single row tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f64) -> Self {
        self.row_tolerances = vec![tolerance];
        self
    }

    /// One pass at [`DEFAULT_ROW_TOLERANCE`].
    pub fn single_pass(self) -> Self {
        self.with_row_tolerance(DEFAULT_ROW_TOLERANCE)
    }

    pub fn with_column_tolerance(mut self, tolerance: f64) -> Self {
        self.column_tolerance = tolerance;
        self
    }

    /// Tolerances must be finite and non-negative, and the retry sequence
    /// must not shrink.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pair) = self.row_tolerances.windows(2).find(|w| w[1] < w[0]) {
            return Err(ConfigError::Invalid(format!(
                "row_tolerances must be ascending, got {} after {}",
                pair[1], pair[0]
            )));
        }
        for tolerance in self.row_tolerances.iter().chain(std::iter::once(&self.column_tolerance)) {
            if !tolerance.is_finite() || *tolerance < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "tolerance must be a non-negative number, got {tolerance}"
                )));
            }
        }
        Ok(())
    }
}
