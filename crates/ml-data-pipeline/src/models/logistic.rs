//! Logistic classification model.

use super::{Coefficients, LinearScorer, Model};
use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::Deserialize;

const PROBABILITY_COLUMN: &str = "probability";
const LABEL_COLUMN: &str = "label";

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LogisticParams {
    coefficients: Option<Coefficients>,
    intercept: f64,
    threshold: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            threshold: 0.5,
        }
    }
}

/// Binary classifier over the sigmoid of a linear score.
///
/// Outputs a `probability` column and an integer `label` column that is 1
/// where the probability reaches `threshold` (default 0.5).
#[derive(Debug, Clone)]
pub struct LogisticModel {
    scorer: LinearScorer,
    threshold: f64,
}

impl Default for LogisticModel {
    fn default() -> Self {
        Self {
            scorer: LinearScorer::default(),
            threshold: 0.5,
        }
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl LogisticModel {
    /// Build from `model` parameters.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let params: LogisticParams = parse_params(params, "logistic")?;

        if !(params.threshold > 0.0 && params.threshold < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "logistic threshold must be in (0, 1), got {}",
                params.threshold
            )));
        }

        Ok(Self {
            scorer: LinearScorer {
                coefficients: params.coefficients,
                intercept: params.intercept,
            },
            threshold: params.threshold,
        })
    }
}

impl Model for LogisticModel {
    fn name(&self) -> &'static str {
        "logistic"
    }

    fn predict(&self, df: &DataFrame) -> Result<DataFrame> {
        let probabilities: Vec<f64> = self.scorer.score(df)?.into_iter().map(sigmoid).collect();
        let labels: Vec<i32> = probabilities
            .iter()
            .map(|p| i32::from(*p >= self.threshold))
            .collect();

        df!(PROBABILITY_COLUMN => probabilities, LABEL_COLUMN => labels)
            .map_err(|e| PipelineError::Prediction(e.to_string()))
    }
}
