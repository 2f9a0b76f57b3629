//! Feature transformation strategies.
//!
//! A [`DataTransformer`] takes ownership of a frame and returns the
//! transformed frame. All scalers here are shape-preserving: row count and
//! column order are unchanged, scaled columns become `Float64`, and columns
//! that are not scaled pass through untouched.
//!
//! Scalers without pre-fitted statistics fit on the frame they are given, so
//! a scaler instance carries no state from one call to the next.

mod min_max;
mod robust;
mod standard;

pub use min_max::MinMaxScaler;
pub use robust::RobustScaler;
pub use standard::{FittedStatistics, StandardScaler};

use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result};
use crate::utils::{ensure_numeric_column, finite_column, numeric_column_names};
use polars::prelude::*;
use serde::Deserialize;

/// Trait for dataset transformations.
///
/// Implementations must fail with [`PipelineError::Transform`] when a column
/// has an incompatible type or holds out-of-domain values.
pub trait DataTransformer: Send + Sync {
    /// Configuration key of this transformer (e.g. `"standard"`).
    fn name(&self) -> &'static str;

    /// Transform the dataset.
    fn transform(&self, df: DataFrame) -> Result<DataFrame>;
}

/// Passes data through unchanged (`scaling_method: none`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IdentityParams {}

impl IdentityTransformer {
    /// Build from `transformation` parameters; none are accepted.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let _: IdentityParams = parse_params(params, "none")?;
        Ok(Self)
    }
}

impl DataTransformer for IdentityTransformer {
    fn name(&self) -> &'static str {
        "none"
    }

    fn transform(&self, df: DataFrame) -> Result<DataFrame> {
        Ok(df)
    }
}

/// Per-column affine map `(x - center) / scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Affine {
    pub center: f64,
    pub scale: f64,
    pub offset: f64,
}

impl Affine {
    #[inline]
    fn apply(&self, value: f64) -> f64 {
        (value - self.center) / self.scale + self.offset
    }
}

/// Resolve which columns a scaler operates on.
///
/// An empty request selects every numeric column; otherwise each requested
/// column must exist and be numeric.
pub(crate) fn target_columns(df: &DataFrame, requested: &[String]) -> Result<Vec<String>> {
    if requested.is_empty() {
        return Ok(numeric_column_names(df));
    }

    for name in requested {
        ensure_numeric_column(df, name).map_err(|e| PipelineError::Transform(e.to_string()))?;
    }
    Ok(requested.to_vec())
}

/// Fit an [`Affine`] per column with `fit` and apply it.
///
/// `fit` sees the column cast to `Float64`. Empty frames are returned
/// unchanged since there is nothing to fit on.
pub(crate) fn apply_affine<F>(mut df: DataFrame, columns: &[String], mut fit: F) -> Result<DataFrame>
where
    F: FnMut(&str, &Float64Chunked) -> Result<Affine>,
{
    if df.height() == 0 {
        return Ok(df);
    }

    for name in columns {
        let values =
            finite_column(&df, name).map_err(|e| PipelineError::Transform(e.to_string()))?;
        let affine = fit(name, &values)?;
        let scaled = values.apply_values(move |v| affine.apply(v));

        df.replace(name, scaled.into_series())
            .map_err(|e| PipelineError::Transform(format!("replacing column '{}': {}", name, e)))?;
    }

    Ok(df)
}
