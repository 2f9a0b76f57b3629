//! Predictive models.
//!
//! A [`Model`] maps a transformed dataset to a prediction table with exactly
//! one row per input row. Models are not trained here; their parameters come
//! from the `model` configuration section.

mod linear;
mod logistic;

pub use linear::LinearModel;
pub use logistic::LogisticModel;

use crate::error::{PipelineError, Result};
use crate::utils::{finite_column, numeric_column_names};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trait for predictive models.
///
/// Implementations must fail with [`PipelineError::Prediction`] when the
/// dataset's features do not match what the model expects.
pub trait Model: Send + Sync {
    /// Configuration key of this model (e.g. `"linear"`).
    fn name(&self) -> &'static str;

    /// Produce predictions aligned row-for-row with `df`.
    fn predict(&self, df: &DataFrame) -> Result<DataFrame>;
}

/// Feature weights of a linear score.
///
/// `Named` weights select columns by name. `Positional` weights apply to the
/// numeric columns in frame order and must match their count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coefficients {
    Named(BTreeMap<String, f64>),
    Positional(Vec<f64>),
}

/// `intercept + Σ weight * feature` per row.
///
/// Without coefficients every numeric column gets weight 1.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct LinearScorer {
    pub coefficients: Option<Coefficients>,
    pub intercept: f64,
}

impl LinearScorer {
    fn features(&self, df: &DataFrame) -> Result<Vec<(String, f64)>> {
        let features: Vec<(String, f64)> = match &self.coefficients {
            Some(Coefficients::Named(weights)) => weights
                .iter()
                .map(|(name, weight)| (name.clone(), *weight))
                .collect(),
            Some(Coefficients::Positional(weights)) => {
                let columns = numeric_column_names(df);
                if columns.len() != weights.len() {
                    return Err(PipelineError::Prediction(format!(
                        "model expects {} numeric feature(s), dataset has {}",
                        weights.len(),
                        columns.len()
                    )));
                }
                columns.into_iter().zip(weights.iter().copied()).collect()
            }
            None => numeric_column_names(df)
                .into_iter()
                .map(|name| (name, 1.0))
                .collect(),
        };

        if features.is_empty() {
            return Err(PipelineError::Prediction(
                "no numeric feature columns to predict from".to_string(),
            ));
        }
        Ok(features)
    }

    /// Compute one score per row.
    ///
    /// A frame without rows scores to an empty vector, whatever its columns:
    /// a header-only source has no values to infer feature types from.
    pub fn score(&self, df: &DataFrame) -> Result<Vec<f64>> {
        if df.height() == 0 {
            return Ok(Vec::new());
        }

        let mut scores = vec![self.intercept; df.height()];

        for (name, weight) in self.features(df)? {
            let values =
                finite_column(df, &name).map_err(|e| PipelineError::Prediction(e.to_string()))?;
            for (score, value) in scores.iter_mut().zip(values.into_no_null_iter()) {
                *score += weight * value;
            }
        }

        Ok(scores)
    }
}
