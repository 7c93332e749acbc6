use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    photo::{CaptureMode, SessionSettings, StampStyle},
};

/// Main configuration for TimeCam
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Render defaults
    pub pipeline: PipelineConfig,

    /// Capture session behavior
    pub capture: CaptureConfig,

    /// Date stamp settings
    pub stamp: StampConfig,

    /// File output settings
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        self.stamp.validate()?;
        self.output.validate()?;
        Ok(())
    }

    /// Session toggles derived from the capture and stamp sections
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            mode: self.capture.mode,
            show_date_stamp: self.stamp.enabled,
            stamp_style: self.stamp.style.clone(),
            save_original: self.capture.save_original,
            show_grid: self.capture.show_grid,
            grain_seed: self.pipeline.grain_seed,
        }
    }
}

/// Render defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Strength used when none is given (0.0-1.0)
    pub default_strength: f32,

    /// Fixed grain seed for reproducible renders
    pub grain_seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_strength: 1.0,
            grain_seed: None,
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_strength) {
            return Err(ConfigError::InvalidValue {
                key: "pipeline.default_strength".to_string(),
                value: self.default_strength.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Capture session behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub mode: CaptureMode,

    /// Keep unfiltered originals so strength changes start from them
    pub save_original: bool,

    pub show_grid: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Photo,
            save_original: true,
            show_grid: false,
        }
    }
}

/// Date stamp settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    pub enabled: bool,
    pub style: StampStyle,
}

impl StampConfig {
    fn validate(&self) -> Result<()> {
        if let StampStyle::CaptureDate { format } = &self.style {
            let broken = format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
            if broken {
                return Err(ConfigError::InvalidValue {
                    key: "stamp.style.format".to_string(),
                    value: format.clone()
                }.into());
            }
        }

        Ok(())
    }
}

/// File output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Number of files rendered in parallel
    pub processing_threads: usize,

    /// Appended to the input file stem when naming outputs
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            processing_threads: num_cpus::get(),
            suffix: "_timecam".to_string(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidValue {
                key: "output.jpeg_quality".to_string(),
                value: self.jpeg_quality.to_string()
            }.into());
        }

        if self.processing_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "output.processing_threads".to_string(),
                value: self.processing_threads.to_string()
            }.into());
        }

        Ok(())
    }
}
