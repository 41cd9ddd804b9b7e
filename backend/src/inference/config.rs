use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::features::AgeScaler;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed pipeline config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("age_scaler.std must be a positive finite number, got {0}")]
    InvalidScaler(f32),
    #[error("Unknown resize method: {0}")]
    UnknownResizeMethod(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub model_path: String,
    /// Softmax the model output. Disable for exports that already end in one.
    pub apply_softmax: bool,
    pub resize_method: String,
    pub age_scaler: AgeScaler,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: "models/skin_lesion.pt".to_string(),
            apply_softmax: true,
            resize_method: "triangle".to_string(),
            age_scaler: AgeScaler::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_yaml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resize_filter()?;
        let std = self.age_scaler.std;
        if !std.is_finite() || std <= 0.0 {
            return Err(ConfigError::InvalidScaler(std));
        }
        Ok(())
    }

    pub fn resize_filter(&self) -> Result<FilterType, ConfigError> {
        match self.resize_method.to_ascii_lowercase().as_str() {
            "nearest" => Ok(FilterType::Nearest),
            "triangle" | "bilinear" => Ok(FilterType::Triangle),
            "catmullrom" | "bicubic" => Ok(FilterType::CatmullRom),
            "gaussian" => Ok(FilterType::Gaussian),
            "lanczos3" => Ok(FilterType::Lanczos3),
            other => Err(ConfigError::UnknownResizeMethod(other.to_string())),
        }
    }
}
