//! Translation of lifecycle events into outward messages.
//!
//! Parsing stage output follows a zero-data-loss policy: when the output
//! does not match its schema the translator tries to recover an embedded
//! JSON block, and failing that it still forwards the event with no report.

use super::LifecycleEvent;
use crate::core::{Capability, Message};
use crate::errors::TranslationDegradation;
use crate::schemas::{self, Conformed};
use crate::stages::{AgentProfile, StageOutput, StageResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("valid fence pattern")
});

/// A stage result plus the degradation that occurred while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    /// The interpreted result.
    pub result: StageResult,
    /// Set when the payload could not be recovered.
    pub degradation: Option<TranslationDegradation>,
}

/// Maps stage output and lifecycle events to the message protocol.
///
/// All methods are pure.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTranslator;

impl EventTranslator {
    /// Creates a new translator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Interprets raw stage output against the capability's schema.
    #[must_use]
    pub fn interpret(
        &self,
        capability: Capability,
        profile: &AgentProfile,
        started_at: DateTime<Utc>,
        output: StageOutput,
    ) -> Interpretation {
        let base = StageResult::new(capability, &profile.display_name, started_at);

        let (base, outcome) = match output {
            StageOutput::Structured(value) => (base, schemas::conform(capability, value)),
            StageOutput::RawText(text) => {
                let outcome = recover_from_text(capability, &text);
                (base.with_raw(text), outcome)
            }
        };

        match outcome {
            Ok(conformed) => Interpretation {
                result: base
                    .with_payload(conformed.payload)
                    .with_validity(conformed.is_valid, conformed.validation_errors),
                degradation: None,
            },
            Err(reason) => Interpretation {
                result: base,
                degradation: Some(TranslationDegradation::new(capability, reason)),
            },
        }
    }

    /// Maps a lifecycle event to its outward message.
    #[must_use]
    pub fn translate(&self, event: &LifecycleEvent<'_>) -> Message {
        match event {
            LifecycleEvent::StageStarted { profile } => {
                Message::thinking(&profile.display_name, &profile.thinking_style)
            }
            LifecycleEvent::StageCompleted { result } => {
                Message::result(&result.agent, result.payload.clone())
            }
            LifecycleEvent::PipelineCompleted { pipeline, report } => Message::completed(
                report.and_then(|r| r.payload.clone()),
                format!("'{pipeline}' has completed design review!"),
            ),
            LifecycleEvent::PipelineFailed { error } => {
                Message::error(format!("Error occurred during review: {error}"))
            }
        }
    }
}

fn recover_from_text(capability: Capability, text: &str) -> Result<Conformed, String> {
    let mut last_error = None;

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text.trim()) {
        match schemas::conform(capability, value) {
            Ok(conformed) => return Ok(conformed),
            Err(e) => last_error = Some(e),
        }
    }

    for block in FENCED_BLOCK.captures_iter(text).filter_map(|c| c.get(1)) {
        match serde_json::from_str::<serde_json::Value>(block.as_str()) {
            Ok(value) => match schemas::conform(capability, value) {
                Ok(conformed) => return Ok(conformed),
                Err(e) => last_error = Some(e),
            },
            Err(e) => last_error = Some(format!("fenced block is not JSON: {e}")),
        }
    }

    Err(last_error.unwrap_or_else(|| "no structured block found in text output".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MessageStatus, MessageType};
    use crate::errors::{ReviewError, StageExecutionFailure};
    use crate::testing::fixtures;
    use pretty_assertions::assert_eq;

    fn interpret(capability: Capability, output: StageOutput) -> Interpretation {
        EventTranslator::new().interpret(
            capability,
            &AgentProfile::for_capability(capability),
            Utc::now(),
            output,
        )
    }

    #[test]
    fn test_structured_output() {
        let interpretation = interpret(
            Capability::SecurityReview,
            StageOutput::Structured(fixtures::security_review()),
        );

        assert!(interpretation.degradation.is_none());
        assert!(interpretation.result.has_payload());
        assert_eq!(interpretation.result.agent, "Security Architect");
    }

    #[test]
    fn test_plain_json_text() {
        let text = fixtures::review_report().to_string();
        let interpretation = interpret(Capability::Synthesis, StageOutput::RawText(text.clone()));

        assert!(interpretation.degradation.is_none());
        assert_eq!(interpretation.result.raw.as_deref(), Some(text.as_str()));
    }

    #[test]
    fn test_fenced_block_recovered() {
        let text = format!(
            "Here is my analysis.\n```json\n{}\n```\nLet me know if you need more.",
            serde_json::to_string_pretty(&fixtures::performance_review()).unwrap()
        );
        let interpretation = interpret(Capability::PerformanceReview, StageOutput::RawText(text));

        assert!(interpretation.degradation.is_none());
        assert_eq!(
            interpretation.result.payload.unwrap()["reliability_score"]["score"],
            72
        );
    }

    #[test]
    fn test_second_fenced_block_used_when_first_is_wrong() {
        let text = format!(
            "```\n{{\"draft\": true}}\n```\n\n```json\n{}\n```",
            fixtures::security_review()
        );
        let interpretation = interpret(Capability::SecurityReview, StageOutput::RawText(text));

        assert!(interpretation.degradation.is_none());
    }

    #[test]
    fn test_invalid_blueprint_keeps_validity() {
        let interpretation = interpret(
            Capability::DocumentUnderstanding,
            StageOutput::Structured(fixtures::invalid_blueprint(vec!["no diagram".into()])),
        );

        assert!(!interpretation.result.is_valid);
        assert_eq!(interpretation.result.validation_errors, vec!["no diagram"]);
    }

    #[test]
    fn test_garbled_output_degrades() {
        let interpretation = interpret(
            Capability::Synthesis,
            StageOutput::RawText("I could not produce a report, sorry.".to_string()),
        );

        let degradation = interpretation.degradation.unwrap();
        assert_eq!(degradation.capability, Capability::Synthesis);
        assert!(degradation.reason.contains("no structured block"));
        assert!(!interpretation.result.has_payload());
        assert!(interpretation.result.raw.is_some());
    }

    #[test]
    fn test_broken_fenced_json_degrades() {
        let interpretation = interpret(
            Capability::SecurityReview,
            StageOutput::RawText("```json\n{\"summary\": \n```".to_string()),
        );

        assert!(interpretation.degradation.unwrap().reason.contains("not JSON"));
    }

    #[test]
    fn test_schema_mismatch_degrades() {
        let interpretation = interpret(
            Capability::PerformanceReview,
            StageOutput::Structured(serde_json::json!({"summary": "missing score"})),
        );

        assert!(interpretation.degradation.is_some());
        assert!(!interpretation.result.has_payload());
    }

    #[test]
    fn test_degraded_result_still_translates() {
        let interpretation = interpret(
            Capability::Synthesis,
            StageOutput::RawText("garbage".to_string()),
        );
        let message = EventTranslator::new().translate(&LifecycleEvent::StageCompleted {
            result: &interpretation.result,
        });

        assert_eq!(message, Message::result("Chief Strategist", None));
    }

    #[test]
    fn test_translate_started() {
        let profile = AgentProfile::new("Librarian", "Reading...");
        let message = EventTranslator::new().translate(&LifecycleEvent::StageStarted { profile: &profile });

        assert_eq!(message.message_type, MessageType::Thinking);
        assert_eq!(message.status, MessageStatus::Executing);
        assert_eq!(message.agent.as_deref(), Some("Librarian"));
        assert_eq!(message.message.as_deref(), Some("Reading..."));
    }

    #[test]
    fn test_translate_completed_carries_report() {
        let result = StageResult::new(Capability::Synthesis, "Chief Strategist", Utc::now())
            .with_payload(fixtures::review_report());
        let message = EventTranslator::new().translate(&LifecycleEvent::PipelineCompleted {
            pipeline: "design-review",
            report: Some(&result),
        });

        assert_eq!(message.status, MessageStatus::Completed);
        assert_eq!(message.report.unwrap()["data_available"], true);
        assert_eq!(
            message.message.as_deref(),
            Some("'design-review' has completed design review!")
        );
    }

    #[test]
    fn test_translate_failed() {
        let error = ReviewError::from(StageExecutionFailure::new("Librarian", "upstream 503"));
        let message = EventTranslator::new().translate(&LifecycleEvent::PipelineFailed { error: &error });

        assert_eq!(message.status, MessageStatus::Error);
        assert_eq!(
            message.message.as_deref(),
            Some("Error occurred during review: Stage 'Librarian' failed: upstream 503")
        );
        assert!(message.report.is_none());
    }
}
