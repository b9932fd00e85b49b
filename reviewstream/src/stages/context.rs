//! Read-only context handed to a stage invocation.

use super::StageResult;
use crate::core::Capability;
use crate::validation::{Strictness, ValidatedInput};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// What a stage sees when it is invoked.
///
/// Only results of declared dependencies are visible.
#[derive(Debug, Clone)]
pub struct StageContext {
    run_id: Uuid,
    capability: Capability,
    input: Arc<ValidatedInput>,
    prior: Vec<StageResult>,
}

impl StageContext {
    /// Creates a context exposing only `declared` results from `accumulated`.
    #[must_use]
    pub fn new(
        run_id: Uuid,
        capability: Capability,
        input: Arc<ValidatedInput>,
        accumulated: &[StageResult],
        declared: &HashSet<Capability>,
    ) -> Self {
        let prior = accumulated
            .iter()
            .filter(|r| declared.contains(&r.capability))
            .cloned()
            .collect();

        Self {
            run_id,
            capability,
            input,
            prior,
        }
    }

    /// Returns the run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the capability being invoked.
    #[must_use]
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Returns the input document.
    #[must_use]
    pub fn document(&self) -> &str {
        self.input.document()
    }

    /// Returns the strictness marker set by the validation gate.
    #[must_use]
    pub fn strictness(&self) -> Strictness {
        self.input.strictness()
    }

    /// Returns the result of a declared dependency, if it ran.
    #[must_use]
    pub fn result(&self, capability: Capability) -> Option<&StageResult> {
        self.prior.iter().find(|r| r.capability == capability)
    }

    /// Returns all visible prior results, in execution order.
    #[must_use]
    pub fn results(&self) -> &[StageResult] {
        &self.prior
    }
}
