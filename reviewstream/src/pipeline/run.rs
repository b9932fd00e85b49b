//! State of one pipeline execution.

use crate::core::{Capability, RunStatus};
use crate::errors::ReviewError;
use crate::stages::StageResult;
use crate::validation::ValidatedInput;
use std::sync::Arc;
use uuid::Uuid;

/// One execution instance of a pipeline.
///
/// Owned and mutated only by the runner's worker task.
#[derive(Debug)]
pub struct PipelineRun {
    run_id: Uuid,
    input: Arc<ValidatedInput>,
    results: Vec<StageResult>,
    status: RunStatus,
    next_sequence: u64,
    error: Option<ReviewError>,
}

impl PipelineRun {
    /// Creates a pending run for a validated input.
    #[must_use]
    pub fn new(input: ValidatedInput) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            input: Arc::new(input),
            results: Vec::new(),
            status: RunStatus::Pending,
            next_sequence: 0,
            error: None,
        }
    }

    /// Returns the run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns a shared handle to the input.
    #[must_use]
    pub fn input(&self) -> Arc<ValidatedInput> {
        Arc::clone(&self.input)
    }

    /// Returns the accumulated results, in execution order.
    #[must_use]
    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    /// Returns the result produced for a capability, if any.
    #[must_use]
    pub fn result(&self, capability: Capability) -> Option<&StageResult> {
        self.results.iter().find(|r| r.capability == capability)
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns the error that failed the run, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ReviewError> {
        self.error.as_ref()
    }

    /// Returns the sequence number that the next message will carry.
    #[must_use]
    pub fn peek_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Claims the next message sequence number.
    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Moves the run from pending to running.
    pub fn start(&mut self) {
        if self.status == RunStatus::Pending {
            self.status = RunStatus::Running;
        }
    }

    /// Appends a stage result.
    pub fn record(&mut self, result: StageResult) {
        self.results.push(result);
    }

    /// Marks the run as completed.
    pub fn complete(&mut self) {
        if !self.status.is_terminal() {
            self.status = RunStatus::Completed;
        }
    }

    /// Marks the run as failed, keeping the cause.
    pub fn fail(&mut self, error: ReviewError) {
        if !self.status.is_terminal() {
            self.status = RunStatus::Failed;
            self.error = Some(error);
        }
    }

    /// Consumes the run, returning its results or the error that failed it.
    ///
    /// # Errors
    ///
    /// Returns the recorded error when the run failed.
    pub fn into_outcome(self) -> Result<Vec<StageResult>, ReviewError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.results),
        }
    }
}
