//! Custom error types for the inference pipeline.
//!
//! This module provides the error taxonomy shared by the registry, the
//! strategies, and the orchestrator. Strategies return these errors with `?`;
//! the orchestrator is the only place that contains them.
//!
//! Errors are serializable as `{ code, message }` so an outer service layer
//! can forward them without inspecting the variant.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Capability a configuration key selects a strategy for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// `data_loader.file_type`
    DataLoader,
    /// `transformation.scaling_method`
    Transformer,
    /// `model.type`
    Model,
}

impl StrategyKind {
    /// The configuration field the key was read from.
    pub fn config_field(&self) -> &'static str {
        match self {
            Self::DataLoader => "data_loader.file_type",
            Self::Transformer => "transformation.scaling_method",
            Self::Model => "model.type",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DataLoader => "data loader",
            Self::Transformer => "transformer",
            Self::Model => "model",
        };
        f.write_str(name)
    }
}

/// The main error type for the inference pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A configuration key does not name a registered strategy.
    #[error(
        "Unsupported {kind} '{key}' in {} (expected one of: {})",
        .kind.config_field(),
        .valid.join(", ")
    )]
    UnsupportedStrategy {
        kind: StrategyKind,
        key: String,
        valid: Vec<&'static str>,
    },

    /// The data source could not be read or did not match the expected schema.
    #[error("Failed to load data from '{}': {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// The dataset is incompatible with the configured transformation.
    #[error("Failed to transform data: {0}")]
    Transform(String),

    /// The dataset does not match the features the model expects.
    #[error("Failed to run prediction: {0}")]
    Prediction(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Shorthand for a [`PipelineError::Load`].
    pub fn load(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        PipelineError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for callers that translate failures
    /// (e.g. into response codes).
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedStrategy { .. } => "UNSUPPORTED_STRATEGY",
            Self::Load { .. } => "LOAD_ERROR",
            Self::Transform(_) => "TRANSFORM_ERROR",
            Self::Prediction(_) => "PREDICTION_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Yaml(_) => "YAML_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was raised while resolving configuration,
    /// i.e. before any data was touched.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::UnsupportedStrategy { .. } | Self::InvalidConfig(_) | Self::Yaml(_) => true,
            Self::WithContext { source, .. } => source.is_configuration_error(),
            _ => false,
        }
    }
}

/// Serialize as a struct with `code` and `message` fields.
impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}
