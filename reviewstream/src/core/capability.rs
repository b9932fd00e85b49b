//! Stage capabilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a stage does in the review pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Extracts a structured blueprint from the raw document.
    DocumentUnderstanding,
    /// Looks for bottlenecks and scalability blockers.
    PerformanceReview,
    /// Threat-models the extracted blueprint.
    SecurityReview,
    /// Merges all prior results into the final report.
    Synthesis,
}

impl Capability {
    /// All capabilities, in canonical pipeline order.
    pub const ALL: [Self; 4] = [
        Self::DocumentUnderstanding,
        Self::PerformanceReview,
        Self::SecurityReview,
        Self::Synthesis,
    ];

    /// Returns the snake_case identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentUnderstanding => "document_understanding",
            Self::PerformanceReview => "performance_review",
            Self::SecurityReview => "security_review",
            Self::Synthesis => "synthesis",
        }
    }

    /// Upstream capabilities whose results this capability reads.
    #[must_use]
    pub fn default_dependencies(&self) -> &'static [Self] {
        match self {
            Self::DocumentUnderstanding => &[],
            Self::PerformanceReview | Self::SecurityReview => &[Self::DocumentUnderstanding],
            Self::Synthesis => &[
                Self::DocumentUnderstanding,
                Self::PerformanceReview,
                Self::SecurityReview,
            ],
        }
    }

    /// Display name of the agent that owns this capability.
    #[must_use]
    pub fn default_display_name(&self) -> &'static str {
        match self {
            Self::DocumentUnderstanding => "Librarian",
            Self::PerformanceReview => "Performance Architect",
            Self::SecurityReview => "Security Architect",
            Self::Synthesis => "Chief Strategist",
        }
    }

    /// Text shown to the client while the stage runs.
    #[must_use]
    pub fn default_thinking_style(&self) -> &'static str {
        match self {
            Self::DocumentUnderstanding => "Cataloguing components and interactions...",
            Self::PerformanceReview => "Tracing hot paths and scaling limits...",
            Self::SecurityReview => "Mapping trust boundaries and attack vectors...",
            Self::Synthesis => "Weighing the findings into a final verdict...",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown capability '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_point_upstream() {
        for capability in Capability::ALL {
            for dep in capability.default_dependencies() {
                assert!(dep < &capability, "{dep} should precede {capability}");
            }
        }
    }

    #[test]
    fn test_synthesis_depends_on_everything_else() {
        let deps = Capability::Synthesis.default_dependencies();
        assert_eq!(deps.len(), 3);
        assert!(!deps.contains(&Capability::Synthesis));
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "security_review".parse::<Capability>().unwrap(),
            Capability::SecurityReview
        );
        assert!("librarian".parse::<Capability>().is_err());
    }

    #[test]
    fn test_serialize_matches_display() {
        for capability in Capability::ALL {
            let json = serde_json::to_string(&capability).unwrap();
            assert_eq!(json, format!("\"{capability}\""));
        }
    }
}
