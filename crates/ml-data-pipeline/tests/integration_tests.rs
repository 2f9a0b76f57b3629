//! Integration tests for the inference pipeline.
//!
//! These tests drive the pipeline end to end from configuration files in
//! `tests/fixtures`.

use ml_data_pipeline::{
    DataTransformer, InferencePipeline, LinearModel, LogLevel, MemoryLogger, Model,
    PipelineConfig, PipelineError, PipelineOutcome, PipelineStage, PipelineState,
    StandardScaler, StrategyKind, registry,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_config(filename: &str) -> PipelineConfig {
    let mut config =
        PipelineConfig::from_path(fixtures_path().join(filename)).expect("Failed to load config");

    // Fixture paths are written relative to the crate root
    config.data_loader.file_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(&config.data_loader.file_path);
    config
}

fn build_pipeline(config: &PipelineConfig) -> (InferencePipeline, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    let pipeline = InferencePipeline::builder()
        .strategies_from_config(config)
        .expect("Failed to resolve strategies")
        .logger(logger.clone())
        .build()
        .expect("Failed to build pipeline");
    (pipeline, logger)
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .expect("column should exist")
        .as_materialized_series()
        .f64()
        .expect("column should be f64")
        .into_no_null_iter()
        .collect()
}

// ============================================================================
// Success Scenarios
// ============================================================================

#[test]
fn test_csv_standard_linear_produces_one_prediction_per_row() {
    let config = load_config("standard_linear.yaml");
    let (mut pipeline, logger) = build_pipeline(&config);

    let outcome = pipeline.run(config.data_loader.file_path.clone());

    let predictions = outcome.dataset().expect("run should succeed");
    assert_eq!(predictions.height(), 3);
    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert_eq!(logger.count(LogLevel::Error), 0);

    // Both columns standardise to the same z-scores, summed by the default weights
    let z = (1.5_f64).sqrt();
    let values = f64_column(predictions, "prediction");
    for (actual, expected) in values.iter().zip([-2.0 * z, 0.0, 2.0 * z]) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }
}

#[test]
fn test_json_config_logistic_classification() {
    let config = load_config("people_logistic.json");
    let (mut pipeline, logger) = build_pipeline(&config);

    let predictions = pipeline
        .run(config.data_loader.file_path.clone())
        .into_result()
        .expect("run should succeed");

    assert_eq!(predictions.shape(), (4, 2));
    let labels: Vec<i32> = predictions
        .column("label")
        .unwrap()
        .as_materialized_series()
        .i32()
        .unwrap()
        .into_no_null_iter()
        .collect();

    // bob is youngest with the lowest income, carol the opposite
    assert_eq!(labels[1], 0);
    assert_eq!(labels[2], 1);
    assert!(f64_column(&predictions, "probability")
        .iter()
        .all(|p| *p > 0.0 && *p < 1.0));
    assert_eq!(logger.count(LogLevel::Error), 0);
}

#[test]
fn test_ndjson_file_type_reads_lines_without_format_param() {
    for file_type in ["ndjson", "jsonl"] {
        let config = PipelineConfig::builder()
            .file_type(file_type)
            .file_path(fixtures_path().join("simple.ndjson"))
            .scaling_method("minmax")
            .model_type("linear")
            .model_param("coefficients", serde_json::json!([1.0, 0.0]))
            .build()
            .unwrap();

        let (mut pipeline, _logger) = build_pipeline(&config);
        assert_eq!(pipeline.strategy_names()[0], "ndjson");

        let predictions = pipeline
            .run(config.data_loader.file_path.clone())
            .into_result()
            .unwrap_or_else(|e| panic!("{file_type} run failed: {e}"));

        assert_eq!(f64_column(&predictions, "prediction"), vec![0.0, 0.5, 1.0]);
    }
}

#[test]
fn test_tiny_valued_column_is_standardized() {
    let df = df!("a" => [1e-17, 2e-17, 3e-17]).unwrap();

    let scaled = StandardScaler::default().transform(df).unwrap();
    let predictions = LinearModel::default().predict(&scaled).unwrap();

    let z = 1.5_f64.sqrt();
    let values = f64_column(&predictions, "prediction");
    for (actual, expected) in values.iter().zip([-z, 0.0, z]) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }
}

#[test]
fn test_header_only_csv_yields_empty_predictions() {
    let config = PipelineConfig::builder()
        .file_path(fixtures_path().join("header_only.csv"))
        .scaling_method("standard")
        .model_type("linear")
        .build()
        .unwrap();
    let (mut pipeline, logger) = build_pipeline(&config);

    let predictions = pipeline
        .run(config.data_loader.file_path.clone())
        .into_result()
        .expect("header-only source should succeed");

    assert_eq!(predictions.shape(), (0, 1));
    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert_eq!(logger.count(LogLevel::Error), 0);
}

#[test]
fn test_repeated_runs_are_identical() {
    let config = load_config("standard_linear.yaml");
    let (mut pipeline, _logger) = build_pipeline(&config);

    let first = pipeline
        .run(config.data_loader.file_path.clone())
        .into_dataset()
        .unwrap();
    let second = pipeline
        .run(config.data_loader.file_path.clone())
        .into_dataset()
        .unwrap();

    assert!(first.equals(&second));
}

// ============================================================================
// Configuration Failures
// ============================================================================

#[test]
fn test_unknown_scaling_method_fails_before_any_io() {
    let err = PipelineConfig::from_path(fixtures_path().join("unknown_method.yaml")).unwrap_err();

    match &err {
        PipelineError::UnsupportedStrategy { kind, key, valid } => {
            assert_eq!(*kind, StrategyKind::Transformer);
            assert_eq!(key, "unknown_method");
            assert!(valid.contains(&"standard"));
        }
        other => panic!("expected UnsupportedStrategy, got {other:?}"),
    }
    assert!(err.to_string().contains("unknown_method"));
    assert!(err.is_configuration_error());
}

#[test]
fn test_registry_rejects_unknown_keys_for_every_capability() {
    let params = Default::default();

    assert_eq!(
        registry::resolve_data_loader("xlsx", &params).err().map(|e| e.error_code()),
        Some("UNSUPPORTED_STRATEGY")
    );
    assert_eq!(
        registry::resolve_transformer("unknown_method", &params).err().map(|e| e.error_code()),
        Some("UNSUPPORTED_STRATEGY")
    );
    assert_eq!(
        registry::resolve_model("random_forest", &params).err().map(|e| e.error_code()),
        Some("UNSUPPORTED_STRATEGY")
    );
}

#[test]
fn test_missing_config_file() {
    let err = PipelineConfig::from_path(fixtures_path().join("nope.yaml")).unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
    assert!(err.to_string().contains("nope.yaml"));
}

// ============================================================================
// Stage Failures
// ============================================================================

#[test]
fn test_missing_source_is_a_load_failure() {
    let config = load_config("missing_source.yaml");
    let (mut pipeline, logger) = build_pipeline(&config);

    let outcome = pipeline.run(config.data_loader.file_path.clone());

    assert!(outcome.dataset().is_none());
    assert_eq!(outcome.failed_stage(), Some(PipelineStage::Load));
    assert!(matches!(
        outcome,
        PipelineOutcome::Failure { error: PipelineError::Load { .. }, .. }
    ));
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert_eq!(logger.count(LogLevel::Error), 1);
}

#[test]
fn test_non_numeric_column_is_a_transform_failure() {
    let config = load_config("non_numeric_column.yaml");
    let (mut pipeline, logger) = build_pipeline(&config);

    let outcome = pipeline.run(config.data_loader.file_path.clone());

    assert_eq!(outcome.failed_stage(), Some(PipelineStage::Transform));
    assert_eq!(outcome.error().map(|e| e.error_code()), Some("TRANSFORM_ERROR"));
    assert_ne!(pipeline.state(), PipelineState::Completed);

    let errors = logger.messages(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("name"));
}

#[test]
fn test_unknown_coefficient_column_is_a_predict_failure() {
    let config = PipelineConfig::builder()
        .file_path(fixtures_path().join("simple.csv"))
        .model_type("linear")
        .model_param("coefficients", serde_json::json!({ "c": 1.0 }))
        .build()
        .unwrap();
    let (mut pipeline, logger) = build_pipeline(&config);

    let outcome = pipeline.run(config.data_loader.file_path.clone());

    assert_eq!(outcome.failed_stage(), Some(PipelineStage::Predict));
    assert_eq!(logger.count(LogLevel::Error), 1);
}

#[test]
fn test_pipeline_recovers_after_failed_run() {
    let config = load_config("standard_linear.yaml");
    let (mut pipeline, logger) = build_pipeline(&config);

    assert!(pipeline.run(fixtures_path().join("missing.csv")).is_failure());
    assert_eq!(pipeline.state(), PipelineState::Failed);

    assert!(pipeline.run(config.data_loader.file_path.clone()).is_success());
    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert_eq!(logger.count(LogLevel::Error), 1);
}

// ============================================================================
// Threading
// ============================================================================

#[test]
fn test_pipeline_runs_on_another_thread() {
    let config = load_config("standard_linear.yaml");
    let (mut pipeline, _logger) = build_pipeline(&config);
    let source = config.data_loader.file_path.clone();

    let height = std::thread::spawn(move || {
        pipeline.run(source).into_dataset().map(|df| df.height())
    })
    .join()
    .expect("Thread should not panic");

    assert_eq!(height, Some(3));
}
