//! Per-stage metrics.

use crate::core::Capability;
use crate::stages::StageResult;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Metrics recorded when a stage finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetrics {
    /// The capability that ran.
    pub capability: Capability,
    /// Display name of the agent.
    pub agent: String,
    /// Wall time of the invocation.
    pub duration_ms: f64,
    /// Whether a structured payload was recovered.
    pub has_payload: bool,
    /// The validity flag reported by the stage.
    pub is_valid: bool,
    /// Whether the output degraded during translation.
    pub degraded: bool,
}

impl StageMetrics {
    /// Collects metrics from a finished result.
    #[must_use]
    pub fn from_result(result: &StageResult, degraded: bool) -> Self {
        Self {
            capability: result.capability,
            agent: result.agent.clone(),
            duration_ms: result.duration_ms(),
            has_payload: result.has_payload(),
            is_valid: result.is_valid,
            degraded,
        }
    }

    /// Returns true if a synthesis stage produced nothing usable.
    ///
    /// That is either no parsed report or a report with
    /// `data_available = false`.
    #[must_use]
    pub fn is_empty_synthesis(&self, result: &StageResult) -> bool {
        self.capability == Capability::Synthesis
            && result
                .payload
                .as_ref()
                .and_then(|p| p.get("data_available"))
                .and_then(serde_json::Value::as_bool)
                != Some(true)
    }

}

/// Logs the metrics line for a finished stage, plus an audit line when the
/// synthesis stage produced no data.
pub fn record_stage(result: &StageResult, degraded: bool) -> StageMetrics {
    let metrics = StageMetrics::from_result(result, degraded);

    info!(
        capability = %metrics.capability,
        agent = %metrics.agent,
        duration_ms = metrics.duration_ms,
        has_payload = metrics.has_payload,
        is_valid = metrics.is_valid,
        degraded = metrics.degraded,
        "Stage completed"
    );

    if metrics.is_empty_synthesis(result) {
        warn!(agent = %metrics.agent, "Synthesis produced no usable report");
    }

    metrics
}
