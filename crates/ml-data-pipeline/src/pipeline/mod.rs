//! Pipeline module.
//!
//! This module provides the inference pipeline orchestrator and its
//! lifecycle, outcome and logging types.

mod logger;
mod orchestrator;
mod outcome;
mod state;

pub use logger::{ClosureLogger, LogLevel, LogRecord, MemoryLogger, PipelineLogger, TracingLogger};
pub use orchestrator::{InferencePipeline, InferencePipelineBuilder, PipelineInput};
pub use outcome::PipelineOutcome;
pub use state::{PipelineStage, PipelineState};
