//! Output schema of the performance-review stage.

use serde::{Deserialize, Serialize};

/// Resource exhausted by a bottleneck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Compute bound.
    #[serde(rename = "CPU")]
    Cpu,
    /// Disk or database bound.
    #[serde(rename = "I/O")]
    Io,
    /// Network bound.
    Network,
    /// Memory bound.
    Memory,
}

/// Urgency of a performance fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceSeverity {
    /// Fails under expected load.
    Critical,
    /// Degrades under expected load.
    High,
    /// Degrades under peak load.
    Medium,
}

/// One identified bottleneck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    /// Identifier such as PERF-001.
    pub id: String,
    /// Exhausted resource.
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Component from the registry.
    pub component: String,
    /// Blueprint detail that leads to the bottleneck.
    pub observation: String,
    /// Failure mode at peak.
    pub impact: String,
    /// Urgency.
    pub severity: PerformanceSeverity,
    /// Architectural change needed.
    pub remediation: String,
}

/// A flaw that prevents horizontal scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalabilityBlocker {
    /// The flaw.
    pub issue: String,
    /// Why it blocks scaling.
    pub why_it_blocks_scaling: String,
}

/// Reliability score out of 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityScore {
    /// 0..=100.
    pub score: u8,
    /// Reasoning.
    pub justification: String,
}

/// Output schema of the performance-review stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReview {
    /// High-level view of efficiency.
    pub summary: String,
    /// Bottlenecks.
    #[serde(default)]
    pub bottlenecks: Vec<Bottleneck>,
    /// Scaling blockers.
    #[serde(default)]
    pub scalability_blockers: Vec<ScalabilityBlocker>,
    /// Reliability.
    pub reliability_score: ReliabilityScore,
}

impl PerformanceReview {
    /// Checks constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn check(&self) -> Result<(), String> {
        if self.reliability_score.score > 100 {
            return Err(format!(
                "reliability score {} is outside 0..=100",
                self.reliability_score.score
            ));
        }
        Ok(())
    }
}
