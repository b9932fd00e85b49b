//! Pipeline builder with validation.

use super::StageSpec;
use crate::core::Capability;
use crate::errors::{ContractErrorInfo, PipelineValidationError};
use crate::stages::{AgentProfile, Stage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Name of the standard review pipeline.
pub const DESIGN_REVIEW: &str = "design-review";

/// A validated, dependency-ordered sequence of stages.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    stages: Vec<StageSpec>,
}

impl Pipeline {
    /// Builds the standard four-stage design review.
    ///
    /// `profile_for` supplies the agent profile of each capability.
    ///
    /// # Errors
    ///
    /// Returns an error if a capability is missing or provided twice.
    pub fn design_review<F>(
        stages: impl IntoIterator<Item = Arc<dyn Stage>>,
        profile_for: F,
    ) -> Result<Self, PipelineValidationError>
    where
        F: Fn(Capability) -> AgentProfile,
    {
        let mut builder = PipelineBuilder::new(DESIGN_REVIEW);
        for stage in stages {
            let spec = StageSpec::new(stage);
            let profile = profile_for(spec.capability);
            builder = builder.stage(spec.with_profile(profile))?;
        }
        builder.build()
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Returns the capabilities in execution order.
    #[must_use]
    pub fn execution_order(&self) -> Vec<Capability> {
        self.stages.iter().map(|s| s.capability).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Builder for creating validated pipelines.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    /// The pipeline name.
    name: String,
    /// The stage specifications.
    stages: HashMap<Capability, StageSpec>,
    /// Insertion order for stages.
    stage_order: Vec<Capability>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: HashMap::new(),
            stage_order: Vec::new(),
        }
    }

    /// Adds a stage to the pipeline.
    ///
    /// Stages may be added in any order; dependencies are resolved when the
    /// pipeline is built.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage depends on itself or its capability is
    /// already present.
    pub fn stage(mut self, spec: StageSpec) -> Result<Self, PipelineValidationError> {
        spec.validate()?;

        if self.stages.contains_key(&spec.capability) {
            return Err(PipelineValidationError::new(format!(
                "Capability '{}' is provided by more than one stage",
                spec.capability
            ))
            .with_stages(vec![spec.capability.to_string()])
            .with_error_info(
                ContractErrorInfo::new(
                    "PIPELINE-DUPLICATE",
                    format!("Duplicate stage for '{}'", spec.capability),
                )
                .with_fix_hint("Register exactly one stage per capability."),
            ));
        }

        self.stage_order.push(spec.capability);
        self.stages.insert(spec.capability, spec);
        Ok(self)
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no stages, a dependency is not
    /// provided by any stage, or the dependencies form a cycle.
    pub fn build(mut self) -> Result<Pipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages").with_error_info(
                ContractErrorInfo::new("PIPELINE-EMPTY", "Cannot build an empty pipeline")
                    .with_fix_hint("Add at least one stage to the pipeline before building."),
            ));
        }

        self.check_dependencies()?;
        self.detect_cycles()?;

        let order = topological_sort(&self.stages, &self.stage_order);
        let stages = order
            .into_iter()
            .filter_map(|capability| self.stages.remove(&capability))
            .collect();

        Ok(Pipeline {
            name: self.name,
            stages,
        })
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    fn check_dependencies(&self) -> Result<(), PipelineValidationError> {
        for capability in &self.stage_order {
            let spec = &self.stages[capability];
            let mut deps: Vec<_> = spec.dependencies.iter().collect();
            deps.sort();
            if let Some(dep) = deps.into_iter().find(|d| !self.stages.contains_key(*d)) {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' depends on unknown stage '{}'",
                    spec.capability, dep
                ))
                .with_stages(vec![spec.capability.to_string(), dep.to_string()])
                .with_error_info(
                    ContractErrorInfo::new(
                        "PIPELINE-MISSING-DEP",
                        format!("Dependency '{dep}' not found"),
                    )
                    .with_fix_hint("Add a stage that provides the dependency."),
                ));
            }
        }
        Ok(())
    }

    /// Detects cycles in the dependency graph.
    fn detect_cycles(&self) -> Result<(), PipelineValidationError> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for capability in &self.stage_order {
            if !visited.contains(capability) {
                if let Some(cycle) =
                    self.dfs_cycle(*capability, &mut visited, &mut rec_stack, &mut path)
                {
                    return Err(PipelineValidationError::cycle(
                        cycle.iter().map(ToString::to_string).collect(),
                    ));
                }
            }
        }

        Ok(())
    }

    fn dfs_cycle(
        &self,
        node: Capability,
        visited: &mut HashSet<Capability>,
        rec_stack: &mut HashSet<Capability>,
        path: &mut Vec<Capability>,
    ) -> Option<Vec<Capability>> {
        visited.insert(node);
        rec_stack.insert(node);
        path.push(node);

        if let Some(spec) = self.stages.get(&node) {
            let mut deps: Vec<_> = spec.dependencies.iter().copied().collect();
            deps.sort();
            for dep in deps {
                if !visited.contains(&dep) {
                    if let Some(cycle) = self.dfs_cycle(dep, visited, rec_stack, path) {
                        return Some(cycle);
                    }
                } else if rec_stack.contains(&dep) {
                    let cycle_start = path.iter().position(|n| *n == dep).unwrap_or(0);
                    let mut cycle = path[cycle_start..].to_vec();
                    cycle.push(dep);
                    return Some(cycle);
                }
            }
        }

        path.pop();
        rec_stack.remove(&node);
        None
    }
}

/// Orders stages so every stage follows its dependencies, ties broken by
/// insertion order.
fn topological_sort(
    stages: &HashMap<Capability, StageSpec>,
    stage_order: &[Capability],
) -> Vec<Capability> {
    fn visit(
        node: Capability,
        stages: &HashMap<Capability, StageSpec>,
        stage_order: &[Capability],
        visited: &mut HashSet<Capability>,
        result: &mut Vec<Capability>,
    ) {
        if !visited.insert(node) {
            return;
        }

        if let Some(spec) = stages.get(&node) {
            for dep in stage_order.iter().filter(|c| spec.dependencies.contains(c)) {
                visit(*dep, stages, stage_order, visited, result);
            }
        }

        result.push(node);
    }

    let mut result = Vec::new();
    let mut visited = HashSet::new();
    for capability in stage_order {
        visit(*capability, stages, stage_order, &mut visited, &mut result);
    }
    result
}
