//! Stage specifications.

use crate::core::Capability;
use crate::errors::PipelineValidationError;
use crate::stages::{AgentProfile, Stage};
use std::collections::HashSet;
use std::sync::Arc;

/// Specification for a single stage in a pipeline.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The capability the stage provides. Unique within a pipeline.
    pub capability: Capability,
    /// The stage implementation.
    pub stage: Arc<dyn Stage>,
    /// How the stage's agent appears in the message stream.
    pub profile: AgentProfile,
    /// Capabilities whose results this stage reads.
    pub dependencies: HashSet<Capability>,
}

impl StageSpec {
    /// Creates a specification with the capability's default profile and
    /// dependencies.
    #[must_use]
    pub fn new(stage: Arc<dyn Stage>) -> Self {
        let capability = stage.capability();
        Self {
            capability,
            stage,
            profile: AgentProfile::for_capability(capability),
            dependencies: capability.default_dependencies().iter().copied().collect(),
        }
    }

    /// Sets the agent profile.
    #[must_use]
    pub fn with_profile(mut self, profile: AgentProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Replaces the dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = Capability>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    /// Validates the stage specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage depends on itself.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.dependencies.contains(&self.capability) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' cannot depend on itself",
                self.capability
            ))
            .with_stages(vec![self.capability.to_string()]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedStage;

    #[test]
    fn test_defaults_follow_capability() {
        let spec = StageSpec::new(Arc::new(ScriptedStage::ok(Capability::Synthesis)));

        assert_eq!(spec.capability, Capability::Synthesis);
        assert_eq!(spec.profile.display_name, "Chief Strategist");
        assert_eq!(spec.dependencies.len(), 3);
    }

    #[test]
    fn test_self_dependency() {
        let spec = StageSpec::new(Arc::new(ScriptedStage::ok(Capability::SecurityReview)))
            .with_dependencies([Capability::SecurityReview]);

        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_custom_profile() {
        let spec = StageSpec::new(Arc::new(ScriptedStage::ok(Capability::DocumentUnderstanding)))
            .with_profile(AgentProfile::new("Archivist", "Cataloguing..."));

        assert_eq!(spec.profile.display_name, "Archivist");
        assert!(spec.dependencies.is_empty());
    }
}
