//! Pipeline building and execution.
//!
//! This module provides:
//! - Stage specifications
//! - Pipeline builder with dependency validation
//! - Per-run state
//! - The sequential runner

mod builder;
mod run;
mod runner;
mod spec;

pub use builder::{Pipeline, PipelineBuilder, DESIGN_REVIEW};
pub use run::PipelineRun;
pub use runner::PipelineRunner;
pub use spec::StageSpec;
