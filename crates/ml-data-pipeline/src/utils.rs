//! Shared utilities for the inference pipeline.
//!
//! Column helpers used by both transformers and models, plus the spread
//! check the scalers share.

use polars::prelude::*;
use thiserror::Error;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Column Utilities
// =============================================================================

/// Why a column cannot be used as a numeric feature.
#[derive(Debug, Error, PartialEq)]
pub enum ColumnIssue {
    #[error("column '{0}' not found in dataset")]
    Missing(String),

    #[error("column '{column}' has non-numeric type {dtype}")]
    NonNumeric { column: String, dtype: String },

    #[error("column '{column}' contains {count} null value(s)")]
    Nulls { column: String, count: usize },

    #[error("column '{column}' contains a non-finite value at row {row}")]
    NonFinite { column: String, row: usize },

    #[error("column '{column}' could not be read as numeric: {reason}")]
    Unreadable { column: String, reason: String },
}

/// Names of all numeric columns, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Check that `name` exists and holds a numeric type.
pub fn ensure_numeric_column(df: &DataFrame, name: &str) -> Result<(), ColumnIssue> {
    let column = df
        .column(name)
        .map_err(|_| ColumnIssue::Missing(name.to_string()))?;

    if !is_numeric_dtype(column.dtype()) {
        return Err(ColumnIssue::NonNumeric {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }
    Ok(())
}

/// Read a numeric column cast to `Float64`.
///
/// Every value must be present and finite.
pub fn finite_column(df: &DataFrame, name: &str) -> Result<Float64Chunked, ColumnIssue> {
    ensure_numeric_column(df, name)?;

    let unreadable = |e: PolarsError| ColumnIssue::Unreadable {
        column: name.to_string(),
        reason: e.to_string(),
    };

    let series = df
        .column(name)
        .map_err(unreadable)?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(unreadable)?;

    let null_count = series.null_count();
    if null_count > 0 {
        return Err(ColumnIssue::Nulls {
            column: name.to_string(),
            count: null_count,
        });
    }

    let values = series.f64().map_err(unreadable)?.clone();
    if let Some(row) = values.into_no_null_iter().position(|v| !v.is_finite()) {
        return Err(ColumnIssue::NonFinite {
            column: name.to_string(),
            row,
        });
    }

    Ok(values)
}

/// Render the first `rows` rows of a frame for debug logging.
pub fn preview(df: &DataFrame, rows: usize) -> String {
    format!("{}", df.head(Some(rows)))
}

// =============================================================================
// Statistics
// =============================================================================

/// Largest absolute value in a column, 0.0 when empty.
pub fn max_abs(values: &Float64Chunked) -> f64 {
    let min = values.min().unwrap_or(0.0);
    let max = values.max().unwrap_or(0.0);
    min.abs().max(max.abs())
}

/// Replace a spread that is zero relative to the column's `magnitude`
/// with 1.0, so constant columns are only centred.
///
/// The threshold scales with `magnitude`: a spread of `1e-17` is real on
/// data of order `1e-17` but rounding noise on data of order `1e3`.
#[inline]
pub fn non_zero_scale(spread: f64, magnitude: f64) -> f64 {
    if spread.abs() <= 10.0 * f64::EPSILON * magnitude.abs() {
        1.0
    } else {
        spread
    }
}
