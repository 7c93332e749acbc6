use thiserror::Error;

/// Main error type for the TimeCam library
#[derive(Error, Debug)]
pub enum TimecamError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Catalog-specific errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Era '{name}' has no filter presets")]
    EmptyEra { name: String },

    #[error("Era not found: {id}")]
    EraNotFound { id: String },

    #[error("Preset not found: {id} (era {era})")]
    PresetNotFound { era: String, id: String },

    #[error("Preset '{preset}' parameter {parameter} out of range: {value}")]
    OutOfRange {
        preset: String,
        parameter: String,
        value: f32,
    },

    #[error("Catalog contains no eras")]
    EmptyCatalog,

    #[error("Duplicate era id: {id}")]
    DuplicateEra { id: String },
}

/// Errors raised inside individual pipeline stages.
///
/// These never escape [`Pipeline::apply`](crate::pipeline::Pipeline::apply);
/// the orchestrator turns them into a fallback outcome.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage {stage} failed: {reason}")]
    StageFailed { stage: String, reason: String },
}

/// Photo and buffer handling errors
#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Failed to decode image: {reason}")]
    DecodeFailed { reason: String },

    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Photo not found: {id}")]
    NotFound { id: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using TimecamError
pub type Result<T> = std::result::Result<T, TimecamError>;

impl TimecamError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::EraNotFound { id }) => {
                format!("Era '{}' not found. Run with --list to see available eras.", id)
            }
            Self::Catalog(CatalogError::PresetNotFound { era, id }) => {
                format!("Preset '{}' is not part of era '{}'.", id, era)
            }
            Self::Photo(PhotoError::DecodeFailed { reason }) => {
                format!("Could not read the image ({}). Please check it is a PNG or JPEG file.", reason)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
