//! Strategy registry.
//!
//! Maps configuration keys to the concrete loader, transformer, and model
//! implementations. The mapping is closed: every key is a variant of
//! [`FileType`], [`ScalingMethod`], or [`ModelType`], and each variant is
//! matched to a constructor function. Resolving a key never touches the data
//! source, so a misconfigured pipeline fails before any I/O happens.
//!
//! # Example
//!
//! ```rust,ignore
//! use ml_data_pipeline::registry::{self, ScalingMethod};
//! use ml_data_pipeline::StrategyParams;
//!
//! let method: ScalingMethod = "standard".parse()?;
//! let transformer = registry::get_transformer(method, &StrategyParams::new())?;
//! assert_eq!(transformer.name(), "standard");
//! ```

use crate::config::StrategyParams;
use crate::error::{PipelineError, Result, StrategyKind};
use crate::loaders::{CsvLoader, DataLoader, JsonLayout, JsonLoader, ParquetLoader};
use crate::models::{LinearModel, LogisticModel, Model};
use crate::transformers::{
    DataTransformer, IdentityTransformer, MinMaxScaler, RobustScaler, StandardScaler,
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A closed set of configuration keys for one capability.
pub trait StrategyKey: Copy + Sized + 'static {
    /// Which capability the key selects.
    const KIND: StrategyKind;

    /// Every registered variant, in documentation order.
    const ALL: &'static [Self];

    /// Canonical configuration key.
    fn as_str(&self) -> &'static str;

    /// Alternative spellings accepted when parsing.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Parse a configuration key into a registered strategy.
///
/// Matching ignores ASCII case and surrounding whitespace. Unknown keys fail
/// with [`PipelineError::UnsupportedStrategy`] listing the valid keys.
pub fn parse_key<K: StrategyKey>(key: &str) -> Result<K> {
    let normalized = key.trim().to_ascii_lowercase();
    K::ALL
        .iter()
        .copied()
        .find(|k| k.as_str() == normalized || k.aliases().contains(&normalized.as_str()))
        .ok_or_else(|| PipelineError::UnsupportedStrategy {
            kind: K::KIND,
            key: key.to_string(),
            valid: registered_keys::<K>(),
        })
}

/// The canonical keys registered for a capability.
pub fn registered_keys<K: StrategyKey>() -> Vec<&'static str> {
    K::ALL.iter().map(|k| k.as_str()).collect()
}

// =============================================================================
// Keys
// =============================================================================

/// Source file formats (`data_loader.file_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Comma (or custom delimiter) separated values
    Csv,
    /// JSON array of records
    Json,
    /// Newline-delimited JSON, one record per line
    #[serde(rename = "ndjson")]
    NdJson,
    /// Apache Parquet
    Parquet,
}

impl StrategyKey for FileType {
    const KIND: StrategyKind = StrategyKind::DataLoader;
    const ALL: &'static [Self] = &[Self::Csv, Self::Json, Self::NdJson, Self::Parquet];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::NdJson => "ndjson",
            Self::Parquet => "parquet",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::NdJson => &["jsonl"],
            _ => &[],
        }
    }
}

/// Feature scaling methods (`transformation.scaling_method`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalingMethod {
    /// Zero mean, unit variance
    #[serde(rename = "standard")]
    Standard,
    /// Rescale into a fixed range
    #[serde(rename = "minmax")]
    MinMax,
    /// Median centering, interquartile range scaling
    #[serde(rename = "robust")]
    Robust,
    /// Pass data through unchanged
    #[serde(rename = "none")]
    Identity,
}

impl StrategyKey for ScalingMethod {
    const KIND: StrategyKind = StrategyKind::Transformer;
    const ALL: &'static [Self] = &[Self::Standard, Self::MinMax, Self::Robust, Self::Identity];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::MinMax => "minmax",
            Self::Robust => "robust",
            Self::Identity => "none",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::MinMax => &["min_max"],
            Self::Identity => &["identity"],
            _ => &[],
        }
    }
}

/// Predictive models (`model.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Weighted sum of features plus intercept
    Linear,
    /// Sigmoid of the linear score, with a decision threshold
    Logistic,
}

impl StrategyKey for ModelType {
    const KIND: StrategyKind = StrategyKind::Model;
    const ALL: &'static [Self] = &[Self::Linear, Self::Logistic];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Logistic => "logistic",
        }
    }
}

impl FromStr for FileType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        parse_key(s)
    }
}

impl FromStr for ScalingMethod {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        parse_key(s)
    }
}

impl FromStr for ModelType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        parse_key(s)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ScalingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Factories
// =============================================================================

type LoaderConstructor = fn(&StrategyParams) -> Result<Box<dyn DataLoader>>;
type TransformerConstructor = fn(&StrategyParams) -> Result<Box<dyn DataTransformer>>;
type ModelConstructor = fn(&StrategyParams) -> Result<Box<dyn Model>>;

fn csv_loader(params: &StrategyParams) -> Result<Box<dyn DataLoader>> {
    Ok(Box::new(CsvLoader::from_params(params)?))
}

fn json_loader(params: &StrategyParams) -> Result<Box<dyn DataLoader>> {
    Ok(Box::new(JsonLoader::from_params(params)?))
}

fn ndjson_loader(params: &StrategyParams) -> Result<Box<dyn DataLoader>> {
    Ok(Box::new(JsonLoader::from_params_with_layout(params, JsonLayout::Lines)?))
}

fn parquet_loader(params: &StrategyParams) -> Result<Box<dyn DataLoader>> {
    Ok(Box::new(ParquetLoader::from_params(params)?))
}

fn standard_scaler(params: &StrategyParams) -> Result<Box<dyn DataTransformer>> {
    Ok(Box::new(StandardScaler::from_params(params)?))
}

fn min_max_scaler(params: &StrategyParams) -> Result<Box<dyn DataTransformer>> {
    Ok(Box::new(MinMaxScaler::from_params(params)?))
}

fn robust_scaler(params: &StrategyParams) -> Result<Box<dyn DataTransformer>> {
    Ok(Box::new(RobustScaler::from_params(params)?))
}

fn identity_transformer(params: &StrategyParams) -> Result<Box<dyn DataTransformer>> {
    Ok(Box::new(IdentityTransformer::from_params(params)?))
}

fn linear_model(params: &StrategyParams) -> Result<Box<dyn Model>> {
    Ok(Box::new(LinearModel::from_params(params)?))
}

fn logistic_model(params: &StrategyParams) -> Result<Box<dyn Model>> {
    Ok(Box::new(LogisticModel::from_params(params)?))
}

/// Construct the loader registered for `file_type`.
pub fn get_data_loader(file_type: FileType, params: &StrategyParams) -> Result<Box<dyn DataLoader>> {
    let constructor: LoaderConstructor = match file_type {
        FileType::Csv => csv_loader,
        FileType::Json => json_loader,
        FileType::NdJson => ndjson_loader,
        FileType::Parquet => parquet_loader,
    };
    let loader = constructor(params)?;
    debug!("Resolved data loader '{}'", loader.name());
    Ok(loader)
}

/// Construct the transformer registered for `method`.
pub fn get_transformer(
    method: ScalingMethod,
    params: &StrategyParams,
) -> Result<Box<dyn DataTransformer>> {
    let constructor: TransformerConstructor = match method {
        ScalingMethod::Standard => standard_scaler,
        ScalingMethod::MinMax => min_max_scaler,
        ScalingMethod::Robust => robust_scaler,
        ScalingMethod::Identity => identity_transformer,
    };
    let transformer = constructor(params)?;
    debug!("Resolved transformer '{}'", transformer.name());
    Ok(transformer)
}

/// Construct the model registered for `model_type`.
pub fn get_model(model_type: ModelType, params: &StrategyParams) -> Result<Box<dyn Model>> {
    let constructor: ModelConstructor = match model_type {
        ModelType::Linear => linear_model,
        ModelType::Logistic => logistic_model,
    };
    let model = constructor(params)?;
    debug!("Resolved model '{}'", model.name());
    Ok(model)
}

/// Resolve a loader from its raw configuration key.
pub fn resolve_data_loader(key: &str, params: &StrategyParams) -> Result<Box<dyn DataLoader>> {
    get_data_loader(key.parse()?, params)
}

/// Resolve a transformer from its raw configuration key.
pub fn resolve_transformer(key: &str, params: &StrategyParams) -> Result<Box<dyn DataTransformer>> {
    get_transformer(key.parse()?, params)
}

/// Resolve a model from its raw configuration key.
pub fn resolve_model(key: &str, params: &StrategyParams) -> Result<Box<dyn Model>> {
    get_model(key.parse()?, params)
}
