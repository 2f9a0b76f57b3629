//! ML Data Pipeline Library
//!
//! A configuration-driven inference pipeline built with Rust and Polars.
//!
//! # Overview
//!
//! A pipeline runs three pluggable strategies in a fixed order:
//!
//! - **Data Loading**: CSV, JSON / NDJSON and Parquet sources ([`DataLoader`])
//! - **Transformation**: standard, min-max, robust or no scaling ([`DataTransformer`])
//! - **Inference**: linear regression and logistic classification ([`Model`])
//!
//! Each strategy is chosen by a key in a YAML or JSON configuration file and
//! resolved through the [`registry`]. Every key is checked before any data is
//! read. A stage failure never escapes [`InferencePipeline::run`]: it is
//! logged once and returned as [`PipelineOutcome::Failure`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ml_data_pipeline::{InferencePipeline, PipelineConfig, PipelineOutcome};
//!
//! // config.yaml
//! //
//! // data_loader:
//! //   file_type: csv
//! //   file_path: data/input.csv
//! // transformation:
//! //   scaling_method: standard
//! // model:
//! //   type: linear
//! //   coefficients: { a: 0.5, b: -1.2 }
//! //   intercept: 3.0
//!
//! let config = PipelineConfig::from_path("config.yaml")?;
//! let mut pipeline = InferencePipeline::from_config(&config)?;
//!
//! match pipeline.run(config.data_loader.file_path.clone()) {
//!     PipelineOutcome::Success(predictions) => println!("{predictions}"),
//!     PipelineOutcome::Failure { stage, error } => {
//!         eprintln!("{} failed: {}", stage.display_name(), error)
//!     }
//! }
//! ```
//!
//! # Custom Strategies
//!
//! The builder accepts any implementation of the three capability traits:
//!
//! ```rust,ignore
//! use ml_data_pipeline::{DataTransformer, InferencePipeline, Result};
//! use polars::prelude::*;
//!
//! struct DropNulls;
//!
//! impl DataTransformer for DropNulls {
//!     fn name(&self) -> &'static str {
//!         "drop_nulls"
//!     }
//!
//!     fn transform(&self, df: DataFrame) -> Result<DataFrame> {
//!         Ok(df.drop_nulls::<String>(None)?)
//!     }
//! }
//!
//! let mut pipeline = InferencePipeline::builder()
//!     .loader(Box::new(CsvLoader::default()))
//!     .transformer(Box::new(DropNulls))
//!     .model(Box::new(LinearModel::default()))
//!     .build()?;
//! ```
//!
//! # Logging
//!
//! The pipeline logs through an injected [`PipelineLogger`]. The default,
//! [`TracingLogger`], forwards to `tracing`; install a subscriber to see
//! the events. [`MemoryLogger`] captures them for inspection.

pub mod config;
pub mod error;
pub mod loaders;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod transformers;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    DataLoaderConfig, ModelConfig, PipelineConfig, PipelineConfigBuilder, StrategyParams,
    TransformationConfig,
};
pub use error::{PipelineError, Result, ResultExt, StrategyKind};
pub use loaders::{CsvLoader, DataLoader, JsonLayout, JsonLoader, ParquetLoader};
pub use models::{Coefficients, LinearModel, LogisticModel, Model};
pub use pipeline::{
    ClosureLogger, InferencePipeline, InferencePipelineBuilder, LogLevel, LogRecord, MemoryLogger,
    PipelineInput, PipelineLogger, PipelineOutcome, PipelineStage, PipelineState, TracingLogger,
};
pub use registry::{FileType, ModelType, ScalingMethod};
pub use transformers::{
    DataTransformer, FittedStatistics, IdentityTransformer, MinMaxScaler, RobustScaler,
    StandardScaler,
};
pub use utils::is_numeric_dtype;
