//! Immutable result of one stage execution.

use crate::core::Capability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value produced by one stage, owned by the run once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// The capability that produced the result.
    pub capability: Capability,
    /// Display name of the agent.
    pub agent: String,
    /// Structured payload, absent when the output could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Raw text returned by the stage, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// The validity flag reported by the stage.
    pub is_valid: bool,
    /// Problems reported by the document-understanding stage.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
    /// When the stage started.
    pub started_at: DateTime<Utc>,
    /// When the stage ended.
    pub ended_at: DateTime<Utc>,
}

impl StageResult {
    /// Creates a valid result with no payload yet.
    #[must_use]
    pub fn new(capability: Capability, agent: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            capability,
            agent: agent.into(),
            payload: None,
            raw: None,
            is_valid: true,
            validation_errors: Vec::new(),
            started_at,
            ended_at: Utc::now(),
        }
    }

    /// Sets the structured payload.
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the raw text.
    #[must_use]
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Sets the validity flag and reported errors.
    #[must_use]
    pub fn with_validity(mut self, is_valid: bool, errors: Vec<String>) -> Self {
        self.is_valid = is_valid;
        self.validation_errors = errors;
        self
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }

    /// Returns true if a structured payload is present.
    #[must_use]
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}
