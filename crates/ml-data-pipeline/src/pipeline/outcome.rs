//! Result of one pipeline run.

use super::state::PipelineStage;
use crate::error::{PipelineError, Result};
use polars::prelude::DataFrame;

/// Outcome of [`InferencePipeline::run`](super::InferencePipeline::run).
///
/// `Failure` is the absent result: no dataset is produced, not even a
/// partial one. It is distinct from a `Success` holding an empty frame.
#[must_use = "a failed run is only reported through its outcome"]
#[derive(Debug)]
pub enum PipelineOutcome {
    /// All stages succeeded; holds the prediction table.
    Success(DataFrame),
    /// A stage failed; nothing was produced.
    Failure {
        stage: PipelineStage,
        error: PipelineError,
    },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The prediction table, if the run succeeded.
    pub fn dataset(&self) -> Option<&DataFrame> {
        match self {
            Self::Success(df) => Some(df),
            Self::Failure { .. } => None,
        }
    }

    /// Consume the outcome, keeping only the prediction table.
    pub fn into_dataset(self) -> Option<DataFrame> {
        match self {
            Self::Success(df) => Some(df),
            Self::Failure { .. } => None,
        }
    }

    /// The stage that failed, if any.
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Success(_) => None,
            Self::Failure { stage, .. } => Some(*stage),
        }
    }

    /// The error that ended the run, if any.
    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    /// Convert into a `Result`, attributing a failure to its stage.
    pub fn into_result(self) -> Result<DataFrame> {
        match self {
            Self::Success(df) => Ok(df),
            Self::Failure { stage, error } => {
                Err(error.with_context(format!("{} failed", stage.display_name())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_success_with_empty_frame_is_not_absent() {
        let outcome = PipelineOutcome::Success(DataFrame::empty());
        assert!(outcome.is_success());
        assert_eq!(outcome.dataset().map(|df| df.height()), Some(0));
        assert_eq!(outcome.failed_stage(), None);
    }

    #[test]
    fn test_failure_accessors() {
        let outcome = PipelineOutcome::Failure {
            stage: PipelineStage::Transform,
            error: PipelineError::Transform("bad column".to_string()),
        };

        assert!(outcome.is_failure());
        assert!(outcome.dataset().is_none());
        assert_eq!(outcome.failed_stage(), Some(PipelineStage::Transform));
        assert_eq!(outcome.error().map(|e| e.error_code()), Some("TRANSFORM_ERROR"));
    }

    #[test]
    fn test_into_result_keeps_code_and_names_stage() {
        let outcome = PipelineOutcome::Failure {
            stage: PipelineStage::Load,
            error: PipelineError::load("in.csv", "file does not exist"),
        };

        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.error_code(), "LOAD_ERROR");
        assert!(err.to_string().starts_with("Loading Data failed"));
    }

    #[test]
    fn test_into_dataset() {
        let df = df!("prediction" => [1.0, 2.0]).unwrap();
        let outcome = PipelineOutcome::Success(df.clone());
        assert!(outcome.into_dataset().unwrap().equals(&df));
    }
}
