//! Melbourne housing price prediction
//!
//! Turns raw property attributes into the exact feature vector a trained
//! price model expects, and serves price estimates through a small
//! dashboard-facing boundary.

pub mod app;
pub mod features;
pub mod model;
pub mod predict;
pub mod schema;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::SchemaVersion;

/// A single price estimate returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Predicted sale price in Australian dollars
    pub price_aud: f64,
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HousingError {
    /// The input record or the registry disagrees with the deployed model's
    /// training columns. Not retryable without fixing the input or the
    /// deployment.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A categorical label has no encoding rule. The caller should re-prompt
    /// with one of the enumerated choices.
    #[error("Unknown {attribute} value: {value}")]
    UnknownCategory { attribute: String, value: String },

    /// The model artifact is absent or failed to load. Fatal at startup;
    /// predictions are refused rather than defaulted.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// A numeric input fell outside the widget bounds enforced at the
    /// boundary layer.
    #[error("{attribute} must be between {min} and {max}, got {value}")]
    OutOfRange {
        attribute: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HousingError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub schema: SchemaConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized model artifact
    pub artifact_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Deployed schema generation; must match the model artifact
    pub version: SchemaVersion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory holding pre-rendered insight plots
    pub image_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: ModelConfig {
                artifact_path: "model/house_price_model.json".to_string(),
            },
            schema: SchemaConfig {
                version: SchemaVersion::V1,
            },
            assets: AssetsConfig {
                image_dir: "images".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HousingError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| HousingError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HousingError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
