//! CLI entry point for batch inference.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use ml_data_pipeline::utils::preview;
use ml_data_pipeline::{InferencePipeline, PipelineConfig, PipelineOutcome};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Rotated log files kept in the log directory.
const MAX_LOG_FILES: usize = 14;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Configuration-driven batch inference",
    long_about = "Loads a dataset, scales its features and runs a model, all chosen by a \
                  YAML or JSON configuration file.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  ML_PIPELINE_CONFIG    Configuration file used when --config is omitted\n  \
                  RUST_LOG              Overrides --log-level for console output\n\n\
                  EXAMPLES:\n  \
                  # Run the pipeline described by config.yaml\n  \
                  inference-batch -c config.yaml\n\n  \
                  # Save predictions next to the input\n  \
                  inference-batch -c config.yaml -o predictions.csv\n\n  \
                  # Console only, no log file\n  \
                  inference-batch -c config.yaml --no-log-file"
)]
struct Args {
    /// Path to the pipeline configuration (.yaml, .yml or .json)
    #[arg(short, long, env = "ML_PIPELINE_CONFIG")]
    config: PathBuf,

    /// Write predictions to this file (.csv, .json or .parquet)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Directory for the rotating log file
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Only log to the console
    #[arg(long)]
    no_log_file: bool,

    /// Rows shown in data previews
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber.
///
/// Console output honours `RUST_LOG`, then `--log-level`. The log file,
/// when enabled, receives JSON lines at `--log-level` regardless of
/// `--quiet`. The returned guard must live until the process exits so
/// buffered lines are flushed.
fn init_logging(args: &Args) -> (Option<WorkerGuard>, Option<String>) {
    let effective_level = if args.quiet { "warn" } else { args.log_level.as_str() };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level)),
        );

    let mut file_error = None;
    let (file_layer, guard) = if args.no_log_file {
        (None, None)
    } else {
        match build_file_appender(&args.log_dir) {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_filter(EnvFilter::new(&args.log_level));
                (Some(layer), Some(guard))
            }
            Err(e) => {
                file_error = Some(format!("{:#}", e));
                (None, None)
            }
        }
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    (guard, file_error)
}

fn build_file_appender(log_dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("pipeline")
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .context("cannot open log file")
}

/// Exits non-zero only when the configuration cannot be turned into a
/// pipeline or the predictions cannot be written. A failed stage has
/// already been logged by the pipeline and exits zero.
fn main() -> Result<ExitCode> {
    // Load environment variables from .env file before clap reads them
    dotenv().ok();

    let args = Args::parse();
    let (_guard, file_error) = init_logging(&args);

    if let Some(reason) = file_error {
        warn!("File logging disabled: {}", reason);
    }

    let Some((config, mut pipeline)) = prepare(&args) else {
        return Ok(ExitCode::FAILURE);
    };

    let [loader, transformer, model] = pipeline.strategy_names();
    info!(loader, transformer, model, "Pipeline ready");

    match pipeline.run(config.data_loader.file_path.clone()) {
        PipelineOutcome::Success(mut predictions) => {
            info!(
                "Batch inference produced {} predictions:\n{}",
                predictions.height(),
                preview(&predictions, args.preview_rows)
            );

            if let Some(ref output) = args.output {
                write_predictions(&mut predictions, output)?;
                info!("Predictions written to: {}", output.display());
            }
        }
        PipelineOutcome::Failure { stage, error } => {
            // The pipeline has already logged the failure
            warn!(
                stage = ?stage,
                code = error.error_code(),
                "Batch inference finished without predictions"
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Read the configuration and resolve every strategy, before any data is
/// read. Errors are logged here and reported as `None`.
fn prepare(args: &Args) -> Option<(PipelineConfig, InferencePipeline)> {
    info!("Reading configuration from: {}", args.config.display());
    let config = match PipelineConfig::from_path(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.error_code(), "Invalid configuration: {}", e);
            return None;
        }
    };

    match InferencePipeline::builder()
        .strategies_from_config(&config)
        .and_then(|builder| builder.preview_rows(args.preview_rows).build())
    {
        Ok(pipeline) => Some((config, pipeline)),
        Err(e) => {
            error!(code = e.error_code(), "Cannot build pipeline: {}", e);
            None
        }
    }
}

/// Write the prediction table, choosing the format from the extension.
fn write_predictions(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create output directory {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("cannot create output file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => JsonWriter::new(file)
            .with_json_format(JsonFormat::Json)
            .finish(df)?,
        Some("parquet") => {
            ParquetWriter::new(file).finish(df)?;
        }
        _ => CsvWriter::new(file).include_header(true).finish(df)?,
    }

    Ok(())
}
