//! Configuration types for the inference pipeline.
//!
//! A [`PipelineConfig`] names one strategy per capability plus free-form
//! parameters for each. Strategy keys are resolved when the configuration is
//! constructed, so an unsupported key is reported before any data is read.
//!
//! Configurations are usually read from a YAML file:
//!
//! ```yaml
//! data_loader:
//!   file_type: csv
//!   file_path: data/input.csv
//!   delimiter: ","
//! transformation:
//!   scaling_method: standard
//! model:
//!   type: linear
//!   coefficients: { a: 0.5, b: 2.0 }
//!   intercept: 1.0
//! ```
//!
//! Every key besides `file_type`/`file_path`, `scaling_method`, and `type`
//! is collected into the section's [`StrategyParams`] and handed to the
//! selected strategy.

use crate::error::{PipelineError, Result, ResultExt};
use crate::registry::{FileType, ModelType, ScalingMethod, parse_key};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Free-form, strategy-specific parameters.
pub type StrategyParams = serde_json::Map<String, serde_json::Value>;

/// Decode strategy parameters into a typed parameter struct.
///
/// Unknown or mistyped keys fail with [`PipelineError::InvalidConfig`].
pub fn parse_params<T: DeserializeOwned>(params: &StrategyParams, strategy: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(params.clone())).map_err(|e| {
        PipelineError::InvalidConfig(format!("invalid parameters for '{}': {}", strategy, e))
    })
}

/// `data_loader` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLoaderConfig {
    /// Which loader reads the source.
    pub file_type: FileType,

    /// Location of the source file.
    pub file_path: PathBuf,

    /// Loader-specific parameters.
    #[serde(flatten)]
    pub params: StrategyParams,
}

/// `transformation` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationConfig {
    /// Which transformer scales the features.
    pub scaling_method: ScalingMethod,

    /// Transformer-specific parameters.
    #[serde(flatten)]
    pub params: StrategyParams,
}

/// `model` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfig {
    /// Which model produces predictions.
    #[serde(rename = "type")]
    pub model_type: ModelType,

    /// Model-specific parameters.
    #[serde(flatten)]
    pub params: StrategyParams,
}

/// Validated configuration for one pipeline.
///
/// Use [`PipelineConfig::from_path`] for configuration files or
/// [`PipelineConfig::builder()`] to assemble one in code.
///
/// # Example
///
/// ```rust,ignore
/// use ml_data_pipeline::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .file_type("csv")
///     .file_path("data/input.csv")
///     .scaling_method("standard")
///     .model_type("linear")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub data_loader: DataLoaderConfig,
    pub transformation: TransformationConfig,
    pub model: ModelConfig,
}

/// Configuration as written in the file, before keys are resolved.
#[derive(Debug, Deserialize)]
struct RawPipelineConfig {
    data_loader: RawDataLoaderConfig,
    transformation: RawTransformationConfig,
    model: RawModelConfig,
}

#[derive(Debug, Deserialize)]
struct RawDataLoaderConfig {
    file_type: String,
    file_path: PathBuf,
    #[serde(flatten)]
    params: StrategyParams,
}

#[derive(Debug, Deserialize)]
struct RawTransformationConfig {
    scaling_method: String,
    #[serde(flatten)]
    params: StrategyParams,
}

#[derive(Debug, Deserialize)]
struct RawModelConfig {
    #[serde(rename = "type")]
    model_type: String,
    #[serde(flatten)]
    params: StrategyParams,
}

impl TryFrom<RawPipelineConfig> for PipelineConfig {
    type Error = PipelineError;

    fn try_from(raw: RawPipelineConfig) -> Result<Self> {
        let config = PipelineConfig {
            data_loader: DataLoaderConfig {
                file_type: parse_key(&raw.data_loader.file_type)?,
                file_path: raw.data_loader.file_path,
                params: raw.data_loader.params,
            },
            transformation: TransformationConfig {
                scaling_method: parse_key(&raw.transformation.scaling_method)?,
                params: raw.transformation.params,
            },
            model: ModelConfig {
                model_type: parse_key(&raw.model.model_type)?,
                params: raw.model.params,
            },
        };

        config.validate()?;
        Ok(config)
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Parse and validate a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: RawPipelineConfig = serde_yaml::from_str(yaml)?;
        raw.try_into()
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawPipelineConfig = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// Read a configuration file.
    ///
    /// The format follows the extension: `.yaml`/`.yml` or `.json`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(PipelineError::from)
            .context(format!("Reading configuration '{}'", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(PipelineError::InvalidConfig(format!(
                "unsupported configuration format {:?} for '{}' (expected .yaml, .yml or .json)",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    /// Validate fields that are not strategy keys.
    pub fn validate(&self) -> Result<()> {
        if self.data_loader.file_path.as_os_str().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "data_loader.file_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
///
/// Strategy keys are given as strings and resolved in [`build`](Self::build).
/// Unset keys default to `csv`, `none`, and `linear`; `file_path` is required.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    file_type: Option<String>,
    file_path: Option<PathBuf>,
    loader_params: StrategyParams,
    scaling_method: Option<String>,
    transformer_params: StrategyParams,
    model_type: Option<String>,
    model_params: StrategyParams,
}

impl PipelineConfigBuilder {
    /// Set the source file format key (e.g. `"csv"`).
    pub fn file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    /// Set the source file location.
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Add a loader parameter.
    pub fn loader_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.loader_params.insert(key.into(), value.into());
        self
    }

    /// Set the scaling method key (e.g. `"standard"`).
    pub fn scaling_method(mut self, method: impl Into<String>) -> Self {
        self.scaling_method = Some(method.into());
        self
    }

    /// Add a transformer parameter.
    pub fn transformer_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.transformer_params.insert(key.into(), value.into());
        self
    }

    /// Set the model type key (e.g. `"linear"`).
    pub fn model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self
    }

    /// Add a model parameter.
    pub fn model_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.model_params.insert(key.into(), value.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig`, or an error naming the first
    /// unsupported key or missing field.
    pub fn build(self) -> Result<PipelineConfig> {
        let file_path = self.file_path.ok_or_else(|| {
            PipelineError::InvalidConfig("data_loader.file_path is required".to_string())
        })?;

        let raw = RawPipelineConfig {
            data_loader: RawDataLoaderConfig {
                file_type: self.file_type.unwrap_or_else(|| "csv".to_string()),
                file_path,
                params: self.loader_params,
            },
            transformation: RawTransformationConfig {
                scaling_method: self.scaling_method.unwrap_or_else(|| "none".to_string()),
                params: self.transformer_params,
            },
            model: RawModelConfig {
                model_type: self.model_type.unwrap_or_else(|| "linear".to_string()),
                params: self.model_params,
            },
        };

        raw.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrategyKind;
    use serde_json::json;

    const YAML: &str = r#"
data_loader:
  file_type: csv
  file_path: data/input.csv
  delimiter: ";"
transformation:
  scaling_method: standard
  columns: [a, b]
model:
  type: linear
  intercept: 1.5
"#;

    #[test]
    fn test_from_yaml_resolves_keys_and_collects_params() {
        let config = PipelineConfig::from_yaml_str(YAML).unwrap();

        assert_eq!(config.data_loader.file_type, FileType::Csv);
        assert_eq!(config.data_loader.file_path, PathBuf::from("data/input.csv"));
        assert_eq!(config.data_loader.params.get("delimiter"), Some(&json!(";")));
        assert!(!config.data_loader.params.contains_key("file_type"));

        assert_eq!(config.transformation.scaling_method, ScalingMethod::Standard);
        assert_eq!(config.transformation.params.get("columns"), Some(&json!(["a", "b"])));

        assert_eq!(config.model.model_type, ModelType::Linear);
        assert_eq!(config.model.params.get("intercept"), Some(&json!(1.5)));
    }

    #[test]
    fn test_unknown_scaling_method_fails_at_construction() {
        let yaml = YAML.replace("scaling_method: standard", "scaling_method: unknown_method");
        let err = PipelineConfig::from_yaml_str(&yaml).unwrap_err();

        match err {
            PipelineError::UnsupportedStrategy { kind, key, .. } => {
                assert_eq!(kind, StrategyKind::Transformer);
                assert_eq!(key, "unknown_method");
            }
            other => panic!("Expected UnsupportedStrategy, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_section_is_a_yaml_error() {
        let yaml = "data_loader:\n  file_type: csv\n  file_path: x.csv\n";
        let err = PipelineConfig::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.error_code(), "YAML_ERROR");
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "data_loader": {"file_type": "parquet", "file_path": "data.parquet"},
            "transformation": {"scaling_method": "minmax", "feature_range": [-1.0, 1.0]},
            "model": {"type": "logistic", "threshold": 0.7}
        }"#;

        let config = PipelineConfig::from_json_str(json).unwrap();
        assert_eq!(config.data_loader.file_type, FileType::Parquet);
        assert_eq!(config.transformation.scaling_method, ScalingMethod::MinMax);
        assert_eq!(config.model.model_type, ModelType::Logistic);
        assert_eq!(config.model.params.get("threshold"), Some(&json!(0.7)));
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder()
            .file_path("input.csv")
            .build()
            .unwrap();

        assert_eq!(config.data_loader.file_type, FileType::Csv);
        assert_eq!(config.transformation.scaling_method, ScalingMethod::Identity);
        assert_eq!(config.model.model_type, ModelType::Linear);
    }

    #[test]
    fn test_builder_requires_file_path() {
        let result = PipelineConfig::builder().file_type("csv").build();
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_rejects_empty_file_path() {
        let result = PipelineConfig::builder().file_path("").build();
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_rejects_unknown_model() {
        let result = PipelineConfig::builder()
            .file_path("input.csv")
            .model_type("xgboost")
            .build();

        assert!(matches!(
            result,
            Err(PipelineError::UnsupportedStrategy { kind: StrategyKind::Model, .. })
        ));
    }

    #[test]
    fn test_builder_params() {
        let config = PipelineConfig::builder()
            .file_path("input.csv")
            .loader_param("has_header", false)
            .transformer_param("with_mean", false)
            .model_param("output_column", "score")
            .build()
            .unwrap();

        assert_eq!(config.data_loader.params.get("has_header"), Some(&json!(false)));
        assert_eq!(config.transformation.params.get("with_mean"), Some(&json!(false)));
        assert_eq!(config.model.params.get("output_column"), Some(&json!("score")));
    }

    #[test]
    fn test_from_path_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "x = 1").unwrap();

        let result = PipelineConfig::from_path(&path);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_path_missing_file_keeps_io_code() {
        let result = PipelineConfig::from_path("/definitely/not/here.yaml");
        assert_eq!(result.unwrap_err().error_code(), "IO_ERROR");
    }

    #[test]
    fn test_config_serialization_uses_config_keys() {
        let config = PipelineConfig::from_yaml_str(YAML).unwrap();
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["data_loader"]["file_type"], json!("csv"));
        assert_eq!(json["data_loader"]["delimiter"], json!(";"));
        assert_eq!(json["transformation"]["scaling_method"], json!("standard"));
        assert_eq!(json["model"]["type"], json!("linear"));
    }

    #[test]
    fn test_parse_params_rejects_wrong_types() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Params {
            threshold: f64,
        }

        let mut params = StrategyParams::new();
        params.insert("threshold".to_string(), json!("high"));
        let result: Result<Params> = parse_params(&params, "logistic");
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }
}
