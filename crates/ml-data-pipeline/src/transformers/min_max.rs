//! Min-max scaling.

use super::{Affine, DataTransformer, apply_affine, target_columns};
use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result};
use crate::utils::{max_abs, non_zero_scale};
use polars::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MinMaxParams {
    columns: Vec<String>,
    feature_range: [f64; 2],
}

impl Default for MinMaxParams {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            feature_range: [0.0, 1.0],
        }
    }
}

/// Rescales columns linearly into `feature_range` (default `[0, 1]`).
///
/// A constant column maps to the lower bound.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    columns: Vec<String>,
    lower: f64,
    upper: f64,
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            lower: 0.0,
            upper: 1.0,
        }
    }
}

impl MinMaxScaler {
    /// Build from `transformation` parameters.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let params: MinMaxParams = parse_params(params, "minmax")?;
        let [lower, upper] = params.feature_range;

        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(PipelineError::InvalidConfig(format!(
                "minmax feature_range must be increasing, got [{}, {}]",
                lower, upper
            )));
        }

        Ok(Self {
            columns: params.columns,
            lower,
            upper,
        })
    }

    fn fit(&self, values: &Float64Chunked) -> Affine {
        let min = values.min().unwrap_or(0.0);
        let max = values.max().unwrap_or(0.0);

        Affine {
            center: min,
            scale: non_zero_scale(max - min, max_abs(values)) / (self.upper - self.lower),
            offset: self.lower,
        }
    }
}

impl DataTransformer for MinMaxScaler {
    fn name(&self) -> &'static str {
        "minmax"
    }

    fn transform(&self, df: DataFrame) -> Result<DataFrame> {
        let columns = target_columns(&df, &self.columns)?;
        apply_affine(df, &columns, |_, values| Ok(self.fit(values)))
    }
}
