//! Serializable analysis configuration.
//!
//! ```toml
//! [analysis]
//! sma_window = 5
//! parallel = true
//!
//! [validation]
//! tolerance = 1e-6
//! ```
//!
//! Every field is optional in the file; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SMA_WINDOW: usize = 5;
pub const MIN_SMA_WINDOW: usize = 1;
pub const MAX_SMA_WINDOW: usize = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("sma_window {window} out of range ({min}..={max})")]
    WindowOutOfRange {
        window: usize,
        min: usize,
        max: usize,
    },

    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sma_window: usize,
    /// Run the four engines concurrently.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sma_window: DEFAULT_SMA_WINDOW,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    pub fn with_window(window: usize) -> Self {
        Self {
            sma_window: window,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_SMA_WINDOW..=MAX_SMA_WINDOW).contains(&self.sma_window) {
            return Err(ConfigError::WindowOutOfRange {
                window: self.sma_window,
                min: MIN_SMA_WINDOW,
                max: MAX_SMA_WINDOW,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub tolerance: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tolerance: pricelab_core::validation::DEFAULT_TOLERANCE,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricelabConfig {
    pub analysis: AnalysisConfig,
    pub validation: ValidationConfig,
}

impl PricelabConfig {
    /// Load and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.validation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = PricelabConfig::from_toml("").unwrap();
        assert_eq!(config, PricelabConfig::default());
        assert_eq!(config.analysis.sma_window, 5);
        assert!(config.analysis.parallel);
        assert_eq!(config.validation.tolerance, 1e-6);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = PricelabConfig::from_toml("[analysis]\nsma_window = 20\n").unwrap();
        assert_eq!(config.analysis.sma_window, 20);
        assert!(config.analysis.parallel);
    }

    #[test]
    fn full_file_parses() {
        let toml = r#"
[analysis]
sma_window = 10
parallel = false

[validation]
tolerance = 0.001
"#;
        let config = PricelabConfig::from_toml(toml).unwrap();
        assert_eq!(config.analysis.sma_window, 10);
        assert!(!config.analysis.parallel);
        assert_eq!(config.validation.tolerance, 0.001);
    }

    #[test]
    fn window_bounds_are_enforced() {
        for window in [0, 51] {
            let err = PricelabConfig::from_toml(&format!("[analysis]\nsma_window = {window}\n"))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::WindowOutOfRange { window: w, .. } if w == window),
                "window {window}: {err}"
            );
        }
        assert!(AnalysisConfig::with_window(1).validate().is_ok());
        assert!(AnalysisConfig::with_window(50).validate().is_ok());
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let err = PricelabConfig::from_toml("[validation]\ntolerance = -0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTolerance(t) if t == -0.5));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = PricelabConfig::from_toml("[analysis\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PricelabConfig::from_file(Path::new("/nonexistent/pricelab.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
