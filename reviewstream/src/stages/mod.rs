//! Stage trait and implementations.
//!
//! A stage is an opaque analysis step. The pipeline only knows its
//! capability and what it returns; how it decides its output is up to the
//! implementation.

mod context;
#[cfg(feature = "llm")]
mod llm;
mod prompts;
mod result;

pub use context::StageContext;
#[cfg(feature = "llm")]
pub use llm::{ChatSettings, LlmClient, LlmStage};
pub use prompts::instructions;
pub use result::StageResult;

use crate::core::Capability;
use crate::errors::StageExecutionFailure;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// What a stage returns on success.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// Already-structured JSON.
    Structured(serde_json::Value),
    /// Free text that may embed a JSON block.
    RawText(String),
}

impl StageOutput {
    /// Returns the raw text, if this is a text output.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::RawText(text) => Some(text),
            Self::Structured(_) => None,
        }
    }
}

/// Trait for pipeline stages.
///
/// Failing with an error and succeeding with a result that reports
/// `is_valid = false` are both normal outcomes the runner handles.
///
/// `invoke` runs on a runtime worker thread and must not block it. The stage
/// deadline and client-disconnect cancellation only take effect at an
/// `.await`; wrap synchronous or CPU-heavy work in
/// [`tokio::task::spawn_blocking`].
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the capability this stage provides.
    fn capability(&self) -> Capability;

    /// Invokes the stage.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The input document and the results of declared dependencies
    async fn invoke(&self, ctx: &StageContext) -> Result<StageOutput, StageExecutionFailure>;
}

/// How an agent presents itself in the message stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Name shown as `agent` on messages.
    pub display_name: String,
    /// Text of the `thinking` message.
    pub thinking_style: String,
}

impl AgentProfile {
    /// Creates a new profile.
    #[must_use]
    pub fn new(display_name: impl Into<String>, thinking_style: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            thinking_style: thinking_style.into(),
        }
    }

    /// Returns the built-in profile for a capability.
    #[must_use]
    pub fn for_capability(capability: Capability) -> Self {
        Self::new(
            capability.default_display_name(),
            capability.default_thinking_style(),
        )
    }
}
