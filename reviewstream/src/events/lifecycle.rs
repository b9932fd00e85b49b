//! Lifecycle events reported by the runner.

use crate::errors::ReviewError;
use crate::stages::{AgentProfile, StageResult};

/// A raw lifecycle event observed while a pipeline executes.
#[derive(Debug)]
pub enum LifecycleEvent<'a> {
    /// A stage is about to be invoked.
    StageStarted {
        /// The agent that owns the stage.
        profile: &'a AgentProfile,
    },
    /// A stage produced its result.
    StageCompleted {
        /// The interpreted result.
        result: &'a StageResult,
    },
    /// Every stage finished.
    PipelineCompleted {
        /// The pipeline name.
        pipeline: &'a str,
        /// The synthesis result, if the pipeline has one.
        report: Option<&'a StageResult>,
    },
    /// The run was aborted.
    PipelineFailed {
        /// Why the run failed.
        error: &'a ReviewError,
    },
}

impl LifecycleEvent<'_> {
    /// Dotted event name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StageStarted { .. } => "stage.started",
            Self::StageCompleted { .. } => "stage.completed",
            Self::PipelineCompleted { .. } => "pipeline.completed",
            Self::PipelineFailed { .. } => "pipeline.failed",
        }
    }

    /// Returns true if this event ends the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PipelineCompleted { .. } | Self::PipelineFailed { .. }
        )
    }
}
