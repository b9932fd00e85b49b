//! Validation gate.
//!
//! Two checkpoints can abort a review: a static pre-flight check on the
//! input document, and a data-dependent check on the blueprint produced by
//! the document-understanding stage.

use crate::core::Capability;
use crate::errors::ValidationFailure;
use crate::stages::StageResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Feedback returned when the document is below the minimum length.
pub const TOO_SHORT_FEEDBACK: &str = "The architecture document is too short to be analyzed.";

/// How strictly downstream stages should treat the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Stages must not infer facts absent from the document.
    #[default]
    High,
    /// Stages may fill gaps with reasonable assumptions.
    Low,
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown strictness '{other}'")),
        }
    }
}

/// A document that passed pre-flight validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    document: String,
    strictness: Strictness,
}

impl ValidatedInput {
    /// Returns the document text.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Returns the strictness marker.
    #[must_use]
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }
}

/// Enforces input and extracted-data preconditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationGate {
    min_length: usize,
    strictness: Strictness,
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self::new(50, Strictness::High)
    }
}

impl ValidationGate {
    /// Creates a gate with a minimum length in characters.
    #[must_use]
    pub fn new(min_length: usize, strictness: Strictness) -> Self {
        Self {
            min_length,
            strictness,
        }
    }

    /// Returns the minimum document length in characters.
    #[must_use]
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Pre-flight check on the input document.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` when the document is shorter than the
    /// minimum length.
    pub fn validate(&self, document: &str) -> Result<ValidatedInput, ValidationFailure> {
        let length = document.chars().count();
        if length < self.min_length {
            debug!(length, min_length = self.min_length, "Document rejected by pre-flight check");
            return Err(ValidationFailure::new(TOO_SHORT_FEEDBACK));
        }

        Ok(ValidatedInput {
            document: document.to_string(),
            strictness: self.strictness,
        })
    }

    /// Post-stage check on a freshly produced result.
    ///
    /// Only a parsed document-understanding result reporting
    /// `is_valid = false` aborts; every other result passes.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` carrying the stage-reported errors.
    pub fn check_extraction(&self, result: &StageResult) -> Result<(), ValidationFailure> {
        if result.capability != Capability::DocumentUnderstanding || !result.has_payload() {
            return Ok(());
        }
        if result.is_valid {
            return Ok(());
        }
        Err(ValidationFailure::from_errors(result.validation_errors.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_rejects_short_document() {
        let gate = ValidationGate::default();
        let err = gate.validate("too short").unwrap_err();

        assert_eq!(err.feedback, TOO_SHORT_FEEDBACK);
    }

    #[test]
    fn test_boundary_length() {
        let gate = ValidationGate::new(10, Strictness::High);

        assert!(gate.validate("123456789").is_err());
        assert!(gate.validate("1234567890").is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        let gate = ValidationGate::new(4, Strictness::High);
        // four characters, twelve bytes
        assert!(gate.validate("ééé").is_err());
        assert!(gate.validate("éééé").is_ok());
    }

    #[test]
    fn test_attaches_strictness() {
        let gate = ValidationGate::new(1, Strictness::Low);
        let input = gate.validate("design").unwrap();

        assert_eq!(input.strictness(), Strictness::Low);
        assert_eq!(input.document(), "design");
    }

    #[test]
    fn test_invalid_blueprint_aborts() {
        let result = StageResult::new(Capability::DocumentUnderstanding, "Librarian", Utc::now())
            .with_payload(json!({}))
            .with_validity(false, vec!["no components".to_string()]);

        let err = ValidationGate::default().check_extraction(&result).unwrap_err();
        assert_eq!(err.feedback, "no components");
    }

    #[test]
    fn test_unparsed_blueprint_passes() {
        let result = StageResult::new(Capability::DocumentUnderstanding, "Librarian", Utc::now())
            .with_validity(false, Vec::new());

        assert!(ValidationGate::default().check_extraction(&result).is_ok());
    }

    #[test]
    fn test_other_capabilities_pass() {
        let result = StageResult::new(Capability::SecurityReview, "Security Architect", Utc::now())
            .with_payload(json!({}))
            .with_validity(false, Vec::new());

        assert!(ValidationGate::default().check_extraction(&result).is_ok());
    }

    #[test]
    fn test_strictness_from_str() {
        assert_eq!("HIGH".parse::<Strictness>().unwrap(), Strictness::High);
        assert!("medium".parse::<Strictness>().is_err());
    }
}
