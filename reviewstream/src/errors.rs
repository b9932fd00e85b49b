//! Error types for the review pipeline.
//!
//! Every failure that can happen while a review runs is funnelled into
//! [`ReviewError`]. The runner converts it into a single terminal `error`
//! message, so none of these ever escape the worker task.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::core::Capability;

/// The main error type for review operations.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// An input or extracted-data precondition was not met.
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// A stage invocation failed.
    #[error("{0}")]
    StageExecution(#[from] StageExecutionFailure),

    /// A stage did not finish within its deadline.
    #[error("Stage '{stage}' timed out after {}", format_deadline(.timeout))]
    StageTimeout {
        /// The stage that timed out.
        stage: String,
        /// The configured deadline.
        timeout: Duration,
    },

    /// The run was cancelled before it finished.
    #[error("Review cancelled: {0}")]
    Cancelled(String),

    /// The stage graph is malformed.
    #[error("{0}")]
    Pipeline(#[from] PipelineValidationError),

    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReviewError {
    /// Returns true if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns the error kind used in HTTP error bodies.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            _ => "REVIEW_ERROR",
        }
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Raised when the input document or the extracted blueprint fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{feedback}")]
pub struct ValidationFailure {
    /// Human-readable feedback for the caller.
    pub feedback: String,
    /// Individual problems reported by the document-understanding stage.
    pub errors: Vec<String>,
}

impl ValidationFailure {
    /// Creates a validation failure with a single feedback message.
    #[must_use]
    pub fn new(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            errors: Vec::new(),
        }
    }

    /// Creates a validation failure from a list of reported errors.
    ///
    /// An empty list falls back to a generic "Invalid doc." feedback.
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        let feedback = if errors.is_empty() {
            "Invalid doc.".to_string()
        } else {
            errors.join("; ")
        };
        Self { feedback, errors }
    }
}

/// Raised when a stage invocation fails.
#[derive(Debug, Clone, Error)]
#[error("Stage '{stage}' failed: {message}")]
pub struct StageExecutionFailure {
    /// The stage that failed.
    pub stage: String,
    /// The best-effort cause.
    pub message: String,
    /// Whether the underlying call could succeed on retry.
    pub retryable: bool,
}

impl StageExecutionFailure {
    /// Creates a new stage execution failure.
    #[must_use]
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Marks the failure as retryable.
    #[must_use]
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

/// A stage result that could not be parsed into its expected schema.
///
/// This is never raised. The translator returns it next to the degraded
/// result so the runner can log it while still forwarding the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationDegradation {
    /// The capability whose output degraded.
    pub capability: Capability,
    /// Why the payload was dropped.
    pub reason: String,
}

impl TranslationDegradation {
    /// Creates a new degradation record.
    #[must_use]
    pub fn new(capability: Capability, reason: impl Into<String>) -> Self {
        Self {
            capability,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for TranslationDegradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} output degraded: {}", self.capability, self.reason)
    }
}

/// Metadata about a graph error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "PIPELINE-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }
}

/// Error raised when the stage graph fails validation at build time.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Creates the error for a dependency cycle.
    #[must_use]
    pub fn cycle(cycle_path: Vec<String>) -> Self {
        let summary = format!("Pipeline contains a dependency cycle: {}", cycle_path.join(" -> "));
        Self::new(format!("Cycle detected in pipeline: {}", cycle_path.join(" -> ")))
            .with_stages(cycle_path)
            .with_error_info(
                ContractErrorInfo::new("PIPELINE-CYCLE", summary)
                    .with_fix_hint("Remove one of the dependencies in the cycle to break it."),
            )
    }
}

/// JSON body returned by non-streaming endpoints when a request fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false.
    pub success: bool,
    /// The HTTP status code.
    pub status_code: u16,
    /// Human-readable message.
    pub message: String,
    /// Error category.
    pub error_type: String,
    /// Optional validation feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error body.
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code,
            message: message.into(),
            error_type: error_type.into(),
            feedback: None,
        }
    }

    /// Attaches validation feedback.
    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// Whole seconds render as `30s`; anything finer as `250ms`.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn format_deadline(limit: &Duration) -> String {
    if limit.subsec_nanos() == 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_from_errors() {
        let failure = ValidationFailure::from_errors(vec![
            "missing deployment target".to_string(),
            "no components".to_string(),
        ]);

        assert_eq!(failure.feedback, "missing deployment target; no components");
        assert_eq!(failure.errors.len(), 2);
    }

    #[test]
    fn test_validation_failure_empty_errors() {
        let failure = ValidationFailure::from_errors(Vec::new());
        assert_eq!(failure.to_string(), "Invalid doc.");
    }

    #[test]
    fn test_review_error_display() {
        let err: ReviewError = ValidationFailure::new("too short").into();
        assert_eq!(err.to_string(), "too short");
        assert!(err.is_validation());
        assert_eq!(err.error_type(), "VALIDATION_ERROR");

        let err: ReviewError = StageExecutionFailure::new("Librarian", "rate limited").into();
        assert_eq!(err.to_string(), "Stage 'Librarian' failed: rate limited");
        assert_eq!(err.error_type(), "REVIEW_ERROR");
    }

    #[test]
    fn test_stage_timeout_display() {
        let err = ReviewError::StageTimeout {
            stage: "Security Architect".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("timed out after 30s"));
    }

    #[test]
    fn test_sub_second_deadline_keeps_millis() {
        let err = ReviewError::StageTimeout {
            stage: "Librarian".to_string(),
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Stage 'Librarian' timed out after 250ms");

        let err = ReviewError::StageTimeout {
            stage: "Librarian".to_string(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "Stage 'Librarian' timed out after 1500ms");
    }

    #[test]
    fn test_cycle_error() {
        let err = PipelineValidationError::cycle(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
        ]);

        assert!(err.to_string().contains("a -> b -> a"));
        assert_eq!(err.error_info.unwrap().code, "PIPELINE-CYCLE");
    }

    #[test]
    fn test_error_response_body() {
        let body = ErrorResponse::new(400, "too short", "VALIDATION_ERROR").with_feedback("too short");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["status_code"], 400);
        assert_eq!(json["feedback"], "too short");
        assert!(serde_json::to_value(ErrorResponse::new(500, "x", "REVIEW_ERROR"))
            .unwrap()
            .get("feedback")
            .is_none());
    }
}
