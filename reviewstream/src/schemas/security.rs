//! Output schema of the security-review stage.

use serde::{Deserialize, Serialize};

/// STRIDE threat category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrideCategory {
    /// Identity spoofing.
    Spoofing,
    /// Data tampering.
    Tampering,
    /// Repudiation.
    Repudiation,
    /// Information disclosure.
    #[serde(rename = "Information Disclosure")]
    InformationDisclosure,
    /// Denial of service.
    #[serde(rename = "Denial of Service")]
    DenialOfService,
    /// Elevation of privilege.
    #[serde(rename = "Elevation of Privilege")]
    ElevationOfPrivilege,
}

/// Risk level of a vulnerability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecuritySeverity {
    /// Exploitable now with severe impact.
    Critical,
    /// Severe impact.
    High,
    /// Moderate impact.
    Medium,
    /// Minor impact.
    Low,
}

/// One threat-modelled vulnerability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Identifier such as SEC-001.
    pub id: String,
    /// STRIDE category.
    pub category: StrideCategory,
    /// OWASP Top 10 mapping.
    pub owasp_mapping: String,
    /// Component from the registry.
    pub component_impacted: String,
    /// The risk.
    pub threat_description: String,
    /// How an attacker would exploit it.
    pub attack_vector: String,
    /// Risk level.
    pub severity: SecuritySeverity,
    /// Actionable fix.
    pub mitigation_strategy: String,
}

/// Output schema of the security-review stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReview {
    /// Security posture overview.
    pub summary: String,
    /// Vulnerabilities.
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    /// Untrusted-to-trusted crossings without validation.
    #[serde(default)]
    pub trust_boundary_violations: Vec<String>,
    /// Missing controls such as MFA or WAF.
    #[serde(default)]
    pub missing_security_controls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multi_word_category() {
        let vuln: Vulnerability = serde_json::from_value(json!({
            "id": "SEC-001",
            "category": "Information Disclosure",
            "owasp_mapping": "A01:2021",
            "component_impacted": "api-gateway",
            "threat_description": "verbose errors leak stack traces",
            "attack_vector": "send malformed JSON",
            "severity": "Medium",
            "mitigation_strategy": "return generic error bodies"
        }))
        .unwrap();

        assert_eq!(vuln.category, StrideCategory::InformationDisclosure);
    }

    #[test]
    fn test_lists_default_empty() {
        let review: SecurityReview =
            serde_json::from_value(json!({"summary": "nothing exposed"})).unwrap();
        assert!(review.vulnerabilities.is_empty());
        assert!(review.missing_security_controls.is_empty());
    }
}
