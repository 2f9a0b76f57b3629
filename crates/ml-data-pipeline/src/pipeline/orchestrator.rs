//! The inference pipeline orchestrator.
//!
//! Runs load → transform → predict over three pluggable strategies and
//! contains any stage failure in a [`PipelineOutcome`].

use super::logger::{ClosureLogger, LogLevel, PipelineLogger, TracingLogger};
use super::outcome::PipelineOutcome;
use super::state::{PipelineStage, PipelineState};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::loaders::DataLoader;
use crate::models::Model;
use crate::registry;
use crate::transformers::DataTransformer;
use crate::utils::preview;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const DEFAULT_PREVIEW_ROWS: usize = 5;

/// What a run starts from.
#[derive(Debug, Clone)]
pub enum PipelineInput {
    /// Read through the pipeline's loader.
    Source(PathBuf),
    /// An already loaded dataset; the load stage is skipped.
    Dataset(DataFrame),
}

impl From<PathBuf> for PipelineInput {
    fn from(path: PathBuf) -> Self {
        Self::Source(path)
    }
}

impl From<&Path> for PipelineInput {
    fn from(path: &Path) -> Self {
        Self::Source(path.to_path_buf())
    }
}

impl From<&str> for PipelineInput {
    fn from(path: &str) -> Self {
        Self::Source(PathBuf::from(path))
    }
}

impl From<DataFrame> for PipelineInput {
    fn from(df: DataFrame) -> Self {
        Self::Dataset(df)
    }
}

/// Runs a data loader, a transformer and a model in sequence.
///
/// Use [`InferencePipeline::from_config`] to resolve the strategies from a
/// [`PipelineConfig`], or [`InferencePipeline::builder()`] to supply them
/// directly.
///
/// # Example
///
/// ```rust,ignore
/// use ml_data_pipeline::{InferencePipeline, PipelineConfig, PipelineOutcome};
///
/// let config = PipelineConfig::from_path("config.yaml")?;
/// let mut pipeline = InferencePipeline::from_config(&config)?;
///
/// match pipeline.run(config.data_loader.file_path.clone()) {
///     PipelineOutcome::Success(predictions) => println!("{predictions}"),
///     PipelineOutcome::Failure { stage, error } => eprintln!("{stage}: {error}"),
/// }
/// ```
pub struct InferencePipeline {
    loader: Box<dyn DataLoader>,
    transformer: Box<dyn DataTransformer>,
    model: Box<dyn Model>,
    logger: Arc<dyn PipelineLogger>,
    preview_rows: usize,
    state: PipelineState,
}

// A pipeline can be built on one thread and run on another
static_assertions::assert_impl_all!(InferencePipeline: Send);

impl std::fmt::Debug for InferencePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferencePipeline")
            .field("loader", &self.loader.name())
            .field("transformer", &self.transformer.name())
            .field("model", &self.model.name())
            .field("state", &self.state)
            .finish()
    }
}

impl InferencePipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> InferencePipelineBuilder {
        InferencePipelineBuilder::default()
    }

    /// Resolve all three strategies from `config`.
    ///
    /// No file is touched here; a bad strategy key or parameter fails
    /// before any data is read.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::builder().strategies_from_config(config)?.build()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Names of the loader, transformer and model, in that order.
    pub fn strategy_names(&self) -> [&'static str; 3] {
        [self.loader.name(), self.transformer.name(), self.model.name()]
    }

    /// Run the pipeline once.
    ///
    /// Never panics on a stage error and never returns a partial result:
    /// any failure is logged once at error level and reported as
    /// [`PipelineOutcome::Failure`]. Running again starts from
    /// [`PipelineState::Created`].
    pub fn run(&mut self, input: impl Into<PipelineInput>) -> PipelineOutcome {
        self.state = PipelineState::Created;
        let start = Instant::now();
        self.log(LogLevel::Info, "Pipeline execution started.");

        match self.execute(input.into()) {
            Ok(predictions) => {
                self.enter(PipelineState::Completed);
                self.log(
                    LogLevel::Info,
                    &format!(
                        "Pipeline execution completed in {} ms ({} rows).",
                        start.elapsed().as_millis(),
                        predictions.height()
                    ),
                );
                PipelineOutcome::Success(predictions)
            }
            Err((stage, error)) => {
                self.enter(PipelineState::Failed);
                self.log(
                    LogLevel::Error,
                    &format!(
                        "Pipeline execution failed during {}: {}",
                        stage.display_name(),
                        error
                    ),
                );
                PipelineOutcome::Failure { stage, error }
            }
        }
    }

    fn execute(
        &mut self,
        input: PipelineInput,
    ) -> std::result::Result<DataFrame, (PipelineStage, PipelineError)> {
        let df = match input {
            PipelineInput::Source(path) => {
                self.begin(PipelineStage::Load);
                self.log(
                    LogLevel::Info,
                    &format!(
                        "Loading data from '{}' with the '{}' loader.",
                        path.display(),
                        self.loader.name()
                    ),
                );
                let df = self
                    .loader
                    .load(&path)
                    .map_err(|e| (PipelineStage::Load, e))?;
                self.log(
                    LogLevel::Info,
                    &format!(
                        "Data loaded successfully: {} rows x {} columns.",
                        df.height(),
                        df.width()
                    ),
                );
                self.log_preview("Loaded data", &df);
                df
            }
            PipelineInput::Dataset(df) => {
                self.log(
                    LogLevel::Debug,
                    "Dataset supplied by caller; skipping the load stage.",
                );
                df
            }
        };

        self.begin(PipelineStage::Transform);
        self.log(
            LogLevel::Info,
            &format!("Applying the '{}' transformation.", self.transformer.name()),
        );
        let transformed = self
            .transformer
            .transform(df)
            .map_err(|e| (PipelineStage::Transform, e))?;
        self.log(LogLevel::Info, "Data transformed successfully.");
        self.log_preview("Transformed data", &transformed);

        self.begin(PipelineStage::Predict);
        self.log(
            LogLevel::Info,
            &format!("Running inference with the '{}' model.", self.model.name()),
        );
        let predictions = self
            .model
            .predict(&transformed)
            .map_err(|e| (PipelineStage::Predict, e))?;

        if predictions.height() != transformed.height() {
            return Err((
                PipelineStage::Predict,
                PipelineError::Prediction(format!(
                    "model '{}' returned {} rows for {} input rows",
                    self.model.name(),
                    predictions.height(),
                    transformed.height()
                )),
            ));
        }

        self.log(LogLevel::Info, "Inference completed successfully.");
        self.log_preview("Predictions", &predictions);

        Ok(predictions)
    }

    fn begin(&mut self, stage: PipelineStage) {
        self.enter(stage.state());
    }

    fn enter(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.logger.log(level, message);
    }

    fn log_preview(&self, label: &str, df: &DataFrame) {
        if self.preview_rows == 0 || !self.logger.enabled(LogLevel::Debug) {
            return;
        }
        self.log(
            LogLevel::Debug,
            &format!("{} preview:\n{}", label, preview(df, self.preview_rows)),
        );
    }
}

/// Builder for creating an [`InferencePipeline`].
///
/// The loader, transformer and model are required; the logger defaults to
/// [`TracingLogger`].
#[derive(Default)]
pub struct InferencePipelineBuilder {
    loader: Option<Box<dyn DataLoader>>,
    transformer: Option<Box<dyn DataTransformer>>,
    model: Option<Box<dyn Model>>,
    logger: Option<Arc<dyn PipelineLogger>>,
    preview_rows: Option<usize>,
}

static_assertions::assert_impl_all!(InferencePipelineBuilder: Send);

impl InferencePipelineBuilder {
    /// Set the data loader.
    pub fn loader(mut self, loader: Box<dyn DataLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the transformer.
    pub fn transformer(mut self, transformer: Box<dyn DataTransformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Set the model.
    pub fn model(mut self, model: Box<dyn Model>) -> Self {
        self.model = Some(model);
        self
    }

    /// Resolve and set all three strategies from `config`.
    pub fn strategies_from_config(self, config: &PipelineConfig) -> Result<Self> {
        let loader = registry::get_data_loader(
            config.data_loader.file_type,
            &config.data_loader.params,
        )?;
        let transformer = registry::get_transformer(
            config.transformation.scaling_method,
            &config.transformation.params,
        )?;
        let model = registry::get_model(config.model.model_type, &config.model.params)?;

        Ok(self.loader(loader).transformer(transformer).model(model))
    }

    /// Set the logger events are sent to.
    pub fn logger(mut self, logger: Arc<dyn PipelineLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Send events to a closure instead of a logger implementation.
    pub fn on_log<F>(mut self, callback: F) -> Self
    where
        F: Fn(LogLevel, &str) + Send + Sync + 'static,
    {
        self.logger = Some(Arc::new(ClosureLogger::new(callback)));
        self
    }

    /// Rows shown in debug previews of intermediate data (0 disables them).
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if a strategy is missing.
    pub fn build(self) -> Result<InferencePipeline> {
        let missing = |what: &str| {
            PipelineError::InvalidConfig(format!("pipeline requires a {}", what))
        };

        Ok(InferencePipeline {
            loader: self.loader.ok_or_else(|| missing("data loader"))?,
            transformer: self.transformer.ok_or_else(|| missing("transformer"))?,
            model: self.model.ok_or_else(|| missing("model"))?,
            logger: self.logger.unwrap_or_else(|| Arc::new(TracingLogger)),
            preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
            state: PipelineState::Created,
        })
    }
}
