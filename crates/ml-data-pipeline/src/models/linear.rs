//! Linear regression model.

use super::{Coefficients, LinearScorer, Model};
use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LinearParams {
    coefficients: Option<Coefficients>,
    intercept: f64,
    output_column: String,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            output_column: "prediction".to_string(),
        }
    }
}

/// Predicts `intercept + Σ coefficient * feature`.
///
/// Parameters: `coefficients` (map of column to weight, or a list matched to
/// the numeric columns in order; default weight 1.0 on every numeric
/// column), `intercept` (default 0.0), `output_column` (default
/// `prediction`).
#[derive(Debug, Clone)]
pub struct LinearModel {
    scorer: LinearScorer,
    output_column: String,
}

impl Default for LinearModel {
    fn default() -> Self {
        Self {
            scorer: LinearScorer::default(),
            output_column: "prediction".to_string(),
        }
    }
}

impl LinearModel {
    /// Build from `model` parameters.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let params: LinearParams = parse_params(params, "linear")?;

        if params.output_column.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "linear output_column must not be empty".to_string(),
            ));
        }

        Ok(Self {
            scorer: LinearScorer {
                coefficients: params.coefficients,
                intercept: params.intercept,
            },
            output_column: params.output_column,
        })
    }
}

impl Model for LinearModel {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn predict(&self, df: &DataFrame) -> Result<DataFrame> {
        let scores = self.scorer.score(df)?;
        df!(self.output_column.as_str() => scores)
            .map_err(|e| PipelineError::Prediction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_predict_rows_align_with_input() {
        let df = df!("a" => [1.0, 2.0, 3.0], "b" => [0.0, 1.0, 0.0]).unwrap();
        let out = LinearModel::default().predict(&df).unwrap();

        assert_eq!(out.shape(), (3, 1));
        let predictions: Vec<f64> = out
            .column("prediction")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(predictions, vec![1.0, 3.0, 3.0]);
    }

    #[test]
    fn test_from_params() {
        let mut params = StrategyParams::new();
        params.insert("coefficients".to_string(), json!({ "a": 2.0 }));
        params.insert("intercept".to_string(), json!(-1.0));
        params.insert("output_column".to_string(), json!("score"));

        let df = df!("a" => [1.0, 2.0]).unwrap();
        let out = LinearModel::from_params(&params).unwrap().predict(&df).unwrap();

        let scores: Vec<f64> = out
            .column("score")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(scores, vec![1.0, 3.0]);
    }

    #[test]
    fn test_empty_output_column_is_invalid() {
        let mut params = StrategyParams::new();
        params.insert("output_column".to_string(), json!(" "));
        assert!(matches!(
            LinearModel::from_params(&params),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_param_is_invalid() {
        let mut params = StrategyParams::new();
        params.insert("learning_rate".to_string(), json!(0.1));
        assert!(matches!(
            LinearModel::from_params(&params),
            Err(PipelineError::InvalidConfig(_))
        ));
    }
}
