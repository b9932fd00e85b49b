//! Typed payload schemas, one per capability.
//!
//! Stage output is untrusted JSON. [`conform`] checks it against the schema
//! of the capability that produced it and returns the normalized payload.

mod blueprint;
mod performance;
mod report;
mod security;

pub use blueprint::{
    ArchitectureStyle, Component, DocBlueprint, Interaction, InteractionNature, Omission,
    Statefulness, SystemIdentity, TechnicalConstraints,
};
pub use performance::{
    Bottleneck, PerformanceReview, PerformanceSeverity, ReliabilityScore, ResourceKind,
    ScalabilityBlocker,
};
pub use report::{Finding, ReviewReport, Scorecard};
pub use security::{SecurityReview, SecuritySeverity, StrideCategory, Vulnerability};

use crate::core::Capability;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A payload that matched its capability's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Conformed {
    /// The normalized payload (defaults filled, unknown fields dropped).
    pub payload: serde_json::Value,
    /// The validity flag. Always true outside document understanding.
    pub is_valid: bool,
    /// Reported problems. Only filled for document understanding.
    pub validation_errors: Vec<String>,
}

/// Checks `value` against the schema of `capability`.
///
/// # Errors
///
/// Returns a description of the mismatch when the value does not fit.
pub fn conform(capability: Capability, value: serde_json::Value) -> Result<Conformed, String> {
    match capability {
        Capability::DocumentUnderstanding => {
            let blueprint: DocBlueprint = parse(value)?;
            Ok(Conformed {
                is_valid: blueprint.is_valid,
                validation_errors: blueprint.validation_errors.clone(),
                payload: normalize(&blueprint)?,
            })
        }
        Capability::PerformanceReview => {
            let review: PerformanceReview = parse(value)?;
            review.check()?;
            valid(&review)
        }
        Capability::SecurityReview => valid(&parse::<SecurityReview>(value)?),
        Capability::Synthesis => valid(&parse::<ReviewReport>(value)?),
    }
}

fn parse<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|e| e.to_string())
}

fn normalize<T: Serialize>(typed: &T) -> Result<serde_json::Value, String> {
    serde_json::to_value(typed).map_err(|e| e.to_string())
}

fn valid<T: Serialize>(typed: &T) -> Result<Conformed, String> {
    Ok(Conformed {
        payload: normalize(typed)?,
        is_valid: true,
        validation_errors: Vec::new(),
    })
}
