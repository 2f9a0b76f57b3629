//! Robust (median / IQR) scaling.

use super::{Affine, DataTransformer, apply_affine, target_columns};
use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result, ResultExt};
use crate::utils::{max_abs, non_zero_scale};
use polars::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RobustParams {
    columns: Vec<String>,
    with_centering: bool,
    with_scaling: bool,
    quantile_range: [f64; 2],
}

impl Default for RobustParams {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            with_centering: true,
            with_scaling: true,
            quantile_range: [25.0, 75.0],
        }
    }
}

/// Centres on the median and scales by the interquartile range.
///
/// Less sensitive to outliers than [`StandardScaler`](super::StandardScaler).
/// `quantile_range` is given in percent (default `[25, 75]`).
#[derive(Debug, Clone)]
pub struct RobustScaler {
    columns: Vec<String>,
    with_centering: bool,
    with_scaling: bool,
    q_low: f64,
    q_high: f64,
}

impl Default for RobustScaler {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            with_centering: true,
            with_scaling: true,
            q_low: 0.25,
            q_high: 0.75,
        }
    }
}

impl RobustScaler {
    /// Build from `transformation` parameters.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let params: RobustParams = parse_params(params, "robust")?;
        let [low, high] = params.quantile_range;

        if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
            return Err(PipelineError::InvalidConfig(format!(
                "robust quantile_range must satisfy 0 <= low < high <= 100, got [{}, {}]",
                low, high
            )));
        }

        Ok(Self {
            columns: params.columns,
            with_centering: params.with_centering,
            with_scaling: params.with_scaling,
            q_low: low / 100.0,
            q_high: high / 100.0,
        })
    }

    fn fit(&self, name: &str, values: &Float64Chunked) -> Result<Affine> {
        let quantile = |q: f64| -> Result<f64> {
            let value = values
                .quantile(q, QuantileMethod::Linear)
                .context(format!("Computing quantile {} of column '{}'", q, name))?;
            Ok(value.unwrap_or(0.0))
        };

        let center = if self.with_centering {
            values.median().unwrap_or(0.0)
        } else {
            0.0
        };

        let scale = if self.with_scaling {
            non_zero_scale(quantile(self.q_high)? - quantile(self.q_low)?, max_abs(values))
        } else {
            1.0
        };

        Ok(Affine {
            center,
            scale,
            offset: 0.0,
        })
    }
}

impl DataTransformer for RobustScaler {
    fn name(&self) -> &'static str {
        "robust"
    }

    fn transform(&self, df: DataFrame) -> Result<DataFrame> {
        let columns = target_columns(&df, &self.columns)?;
        apply_affine(df, &columns, |name, values| self.fit(name, values))
    }
}
