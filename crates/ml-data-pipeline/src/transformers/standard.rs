//! Standardization (z-score) scaling.

use super::{Affine, DataTransformer, apply_affine, target_columns};
use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result};
use crate::utils::{max_abs, non_zero_scale};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pre-fitted statistics for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FittedStatistics {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StandardParams {
    columns: Vec<String>,
    with_mean: bool,
    with_std: bool,
    statistics: Option<BTreeMap<String, FittedStatistics>>,
}

impl Default for StandardParams {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            with_mean: true,
            with_std: true,
            statistics: None,
        }
    }
}

/// Scales columns to zero mean and unit variance.
///
/// Uses the population standard deviation; a constant column is only
/// centred. When `statistics` are configured they are used instead of
/// fitting on the input, and they live as long as the scaler.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    columns: Vec<String>,
    with_mean: bool,
    with_std: bool,
    statistics: Option<BTreeMap<String, FittedStatistics>>,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            with_mean: true,
            with_std: true,
            statistics: None,
        }
    }
}

impl StandardScaler {
    /// Build from `transformation` parameters.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let params: StandardParams = parse_params(params, "standard")?;

        if let Some(statistics) = &params.statistics {
            for (column, stats) in statistics {
                if !stats.mean.is_finite() || !stats.std.is_finite() || stats.std < 0.0 {
                    return Err(PipelineError::InvalidConfig(format!(
                        "invalid fitted statistics for column '{}': mean={}, std={}",
                        column, stats.mean, stats.std
                    )));
                }
            }
        }

        Ok(Self {
            columns: params.columns,
            with_mean: params.with_mean,
            with_std: params.with_std,
            statistics: params.statistics,
        })
    }

    /// Use fixed statistics instead of fitting on each input.
    pub fn with_statistics(mut self, statistics: BTreeMap<String, FittedStatistics>) -> Self {
        self.statistics = Some(statistics);
        self
    }

    fn fit(&self, name: &str, values: &Float64Chunked) -> Result<Affine> {
        let (mean, std) = match &self.statistics {
            Some(statistics) => {
                let stats = statistics.get(name).ok_or_else(|| {
                    PipelineError::Transform(format!("no fitted statistics for column '{}'", name))
                })?;
                (stats.mean, stats.std)
            }
            // population std (ddof = 0)
            None => (values.mean().unwrap_or(0.0), values.std(0).unwrap_or(1.0)),
        };

        Ok(Affine {
            center: if self.with_mean { mean } else { 0.0 },
            scale: if self.with_std {
                non_zero_scale(std, max_abs(values))
            } else {
                1.0
            },
            offset: 0.0,
        })
    }
}

impl DataTransformer for StandardScaler {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn transform(&self, df: DataFrame) -> Result<DataFrame> {
        let requested = match (&self.statistics, self.columns.is_empty()) {
            (Some(statistics), true) => statistics.keys().cloned().collect(),
            _ => self.columns.clone(),
        };
        let columns = target_columns(&df, &requested)?;

        apply_affine(df, &columns, |name, values| self.fit(name, values))
    }
}
