//! Pipeline stages and run states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the fixed load → transform → predict sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the source through the loader
    Load,
    /// Applying the transformer
    Transform,
    /// Running the model
    Predict,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Load => "Loading Data",
            Self::Transform => "Transforming Data",
            Self::Predict => "Running Inference",
        }
    }

    /// The state the pipeline is in while this stage runs.
    pub fn state(&self) -> PipelineState {
        match self {
            Self::Load => PipelineState::Loading,
            Self::Transform => PipelineState::Transforming,
            Self::Predict => PipelineState::Predicting,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lifecycle of an [`InferencePipeline`](super::InferencePipeline).
///
/// ```text
/// Created ─► Loading ─► Transforming ─► Predicting ─► Completed
///    │          │             │              │
///    └──────────┴─────────────┴──────────────┴──────► Failed
/// ```
///
/// `Loading` is skipped when the run is given a dataset directly. A
/// finished pipeline returns to `Created` when it is run again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Created,
    Loading,
    Transforming,
    Predicting,
    Completed,
    Failed,
}

impl PipelineState {
    /// Whether the last run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check whether moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        match (self, next) {
            (Created, Loading) | (Created, Transforming) => true,
            (Loading, Transforming) => true,
            (Transforming, Predicting) => true,
            (Predicting, Completed) => true,
            (Completed, Created) | (Failed, Created) => true,
            (current, Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Loading => "loading",
            Self::Transforming => "transforming",
            Self::Predicting => "predicting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [PipelineState; 6] = [
        PipelineState::Created,
        PipelineState::Loading,
        PipelineState::Transforming,
        PipelineState::Predicting,
        PipelineState::Completed,
        PipelineState::Failed,
    ];

    #[test]
    fn test_forward_transitions() {
        assert!(PipelineState::Created.can_transition_to(PipelineState::Loading));
        assert!(PipelineState::Created.can_transition_to(PipelineState::Transforming));
        assert!(PipelineState::Loading.can_transition_to(PipelineState::Transforming));
        assert!(PipelineState::Transforming.can_transition_to(PipelineState::Predicting));
        assert!(PipelineState::Predicting.can_transition_to(PipelineState::Completed));
    }

    #[test]
    fn test_failed_reachable_only_from_non_terminal_states() {
        for state in ALL_STATES {
            assert_eq!(
                state.can_transition_to(PipelineState::Failed),
                !state.is_terminal(),
                "{state} -> failed"
            );
        }
    }

    #[test]
    fn test_completed_only_after_predicting() {
        for state in ALL_STATES {
            assert_eq!(
                state.can_transition_to(PipelineState::Completed),
                state == PipelineState::Predicting,
                "{state} -> completed"
            );
        }
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!PipelineState::Loading.can_transition_to(PipelineState::Predicting));
        assert!(!PipelineState::Predicting.can_transition_to(PipelineState::Transforming));
        assert!(!PipelineState::Created.can_transition_to(PipelineState::Completed));
        assert!(!PipelineState::Failed.can_transition_to(PipelineState::Completed));
    }

    #[test]
    fn test_stages_run_in_order() {
        let [load, transform, predict] =
            [PipelineStage::Load, PipelineStage::Transform, PipelineStage::Predict]
                .map(|stage| stage.state());

        assert!(PipelineState::Created.can_transition_to(load));
        assert!(load.can_transition_to(transform));
        assert!(transform.can_transition_to(predict));
        assert!(predict.can_transition_to(PipelineState::Completed));
        assert!(!predict.is_terminal());
    }

    #[test]
    fn test_stage_json_values() {
        assert_eq!(serde_json::to_string(&PipelineStage::Load).unwrap(), "\"load\"");
        assert_eq!(
            serde_json::to_string(&PipelineState::Transforming).unwrap(),
            "\"transforming\""
        );
    }

    #[test]
    fn test_stage_display_name() {
        assert_eq!(PipelineStage::Transform.display_name(), "Transforming Data");
        assert_eq!(PipelineStage::Predict.to_string(), "Running Inference");
    }
}
