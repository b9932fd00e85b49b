//! Final report produced by the synthesis stage.

use serde::{Deserialize, Serialize};

/// Headline numbers of the review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    /// Overall health, e.g. "85/100" or "Healthy".
    pub architecture_health: String,
    /// Most critical security or stability risk.
    pub primary_risks: String,
    /// Main performance constraint.
    pub primary_bottleneck: String,
}

/// One prioritised finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// High, Medium or Low.
    pub priority: String,
    /// Security, Performance, Scalability...
    pub category: String,
    /// Short title.
    pub finding: String,
    /// Business or system impact.
    pub impact: String,
    /// Recommended resolution.
    pub fix: String,
}

/// Output schema of the synthesis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// True if the blueprint data was sufficient for analysis.
    pub data_available: bool,
    /// When the report was generated.
    pub generated_at: String,
    /// Headline numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorecard: Option<Scorecard>,
    /// Findings.
    #[serde(default)]
    pub findings: Vec<Finding>,
    /// Mentorship paragraphs on structural issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_dive: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_report() {
        let report: ReviewReport = serde_json::from_value(json!({
            "data_available": false,
            "generated_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        assert!(!report.data_available);
        assert!(report.findings.is_empty());

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("scorecard").is_none());
        assert!(value.get("deep_dive").is_none());
    }
}
