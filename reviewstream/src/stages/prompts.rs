//! Instruction prompts for the LLM-backed stages.

use super::StageContext;
use crate::core::Capability;
use crate::validation::Strictness;
use std::fmt::Write;

const BLUEPRINT_SHAPE: &str = r#"{
  "is_valid": bool,
  "validation_errors": [string],
  "system_identity": {"name": string, "primary_style": "Monolith"|"Microservices"|"Serverless"|"Hybrid", "deployment_target": string, "stated_goals": [string]},
  "component_registry": [{"name": string, "type": string, "technology": string, "hosting": string, "statefulness": "Stateful"|"Stateless"|"Unknown"}],
  "interaction_map": [{"source": string, "destination": string, "protocol": string, "data_exchanged": string, "nature": "Synchronous"|"Asynchronous"}],
  "technical_constraints": {"traffic_expectations": string, "performance_requirements": [string], "security_requirements": [string]},
  "omission": {"missing_from_diagram": [string], "missing_from_text": [string]}
}"#;

const PERFORMANCE_SHAPE: &str = r#"{
  "summary": string,
  "bottlenecks": [{"id": string, "type": "CPU"|"I/O"|"Network"|"Memory", "component": string, "observation": string, "impact": string, "severity": "Critical"|"High"|"Medium", "remediation": string}],
  "scalability_blockers": [{"issue": string, "why_it_blocks_scaling": string}],
  "reliability_score": {"score": 0-100, "justification": string}
}"#;

const SECURITY_SHAPE: &str = r#"{
  "summary": string,
  "vulnerabilities": [{"id": string, "category": "Spoofing"|"Tampering"|"Repudiation"|"Information Disclosure"|"Denial of Service"|"Elevation of Privilege", "owasp_mapping": string, "component_impacted": string, "threat_description": string, "attack_vector": string, "severity": "Critical"|"High"|"Medium"|"Low", "mitigation_strategy": string}],
  "trust_boundary_violations": [string],
  "missing_security_controls": [string]
}"#;

const REPORT_SHAPE: &str = r#"{
  "data_available": bool,
  "generated_at": string,
  "scorecard": {"architecture_health": string, "primary_risks": string, "primary_bottleneck": string},
  "findings": [{"priority": "High"|"Medium"|"Low", "category": string, "finding": string, "impact": string, "fix": string}],
  "deep_dive": string
}"#;

/// Builds the `(system, user)` prompt pair for a stage invocation.
#[must_use]
pub fn instructions(ctx: &StageContext) -> (String, String) {
    let (role, task, shape) = match ctx.capability() {
        Capability::DocumentUnderstanding => (
            "You are a meticulous librarian of software architecture documents.",
            "Extract a structured blueprint of the system described in the document. \
             Set is_valid to false and list the reasons in validation_errors when the \
             document lacks a recognizable system, components or interactions.",
            BLUEPRINT_SHAPE,
        ),
        Capability::PerformanceReview => (
            "You are a principal performance architect.",
            "Using the blueprint, identify bottlenecks, scalability blockers and score \
             the overall reliability of the design.",
            PERFORMANCE_SHAPE,
        ),
        Capability::SecurityReview => (
            "You are a senior security architect who threat-models with STRIDE.",
            "Using the blueprint, list vulnerabilities with their OWASP mapping, trust \
             boundary violations and missing security controls.",
            SECURITY_SHAPE,
        ),
        Capability::Synthesis => (
            "You are the chief strategist reviewing the work of your specialists.",
            "Merge the blueprint, performance and security reviews into a prioritised \
             final report. Set data_available to false when the blueprint was too thin \
             to analyse, and stamp generated_at with the current UTC time.",
            REPORT_SHAPE,
        ),
    };

    let mut system = format!("{role} {task}\n");
    if ctx.strictness() == Strictness::High {
        system.push_str("Do not invent components or facts absent from the inputs.\n");
    }
    let _ = write!(
        system,
        "Respond with a single JSON object inside a ```json fenced block, shaped as:\n{shape}"
    );

    let mut user = format!("Design document:\n\n{}\n", ctx.document());
    for prior in ctx.results() {
        let payload = prior
            .payload
            .as_ref()
            .map_or_else(|| "null".to_string(), ToString::to_string);
        let _ = write!(user, "\nResult of {}:\n{payload}\n", prior.capability);
    }

    (system, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::StageResult;
    use crate::testing::fixtures;
    use crate::validation::ValidationGate;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Arc;
    use uuid::Uuid;

    #[test]
    fn test_synthesis_prompt_embeds_prior_results() {
        let input = Arc::new(ValidationGate::default().validate(fixtures::SAMPLE_DOCUMENT).unwrap());
        let accumulated = vec![StageResult::new(
            Capability::SecurityReview,
            "Security Architect",
            Utc::now(),
        )
        .with_payload(fixtures::security_review())];
        let declared: HashSet<_> = Capability::Synthesis.default_dependencies().iter().copied().collect();
        let ctx = StageContext::new(Uuid::new_v4(), Capability::Synthesis, input, &accumulated, &declared);

        let (system, user) = instructions(&ctx);

        assert!(system.contains("data_available"));
        assert!(system.contains("Do not invent"));
        assert!(user.contains("Result of security_review"));
        assert!(user.contains(fixtures::SAMPLE_DOCUMENT));
    }

    #[test]
    fn test_low_strictness_omits_guard() {
        let input = Arc::new(
            ValidationGate::new(50, Strictness::Low)
                .validate(fixtures::SAMPLE_DOCUMENT)
                .unwrap(),
        );
        let ctx = StageContext::new(
            Uuid::new_v4(),
            Capability::DocumentUnderstanding,
            input,
            &[],
            &HashSet::new(),
        );

        let (system, _) = instructions(&ctx);
        assert!(!system.contains("Do not invent"));
        assert!(system.contains("is_valid"));
    }
}
