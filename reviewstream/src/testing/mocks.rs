//! Scripted stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::fixtures;
use crate::core::Capability;
use crate::errors::StageExecutionFailure;
use crate::stages::{Stage, StageContext, StageOutput};

/// What a [`ScriptedStage`] does when invoked.
#[derive(Debug, Clone)]
pub enum Script {
    /// Return structured JSON.
    Structured(serde_json::Value),
    /// Return free text.
    Raw(String),
    /// Fail with a message.
    Fail(String),
    /// Panic with a message.
    Panic(String),
    /// Sleep, then return the canned payload.
    Slow(Duration),
}

/// A stage that follows a fixed script and records its invocations.
#[derive(Debug)]
pub struct ScriptedStage {
    capability: Capability,
    script: Script,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Capability>>>,
}

impl ScriptedStage {
    /// Creates a stage following `script`.
    #[must_use]
    pub fn new(capability: Capability, script: Script) -> Self {
        Self {
            capability,
            script,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Succeeds with the canned payload of the capability.
    #[must_use]
    pub fn ok(capability: Capability) -> Self {
        Self::structured(capability, fixtures::payload_for(capability))
    }

    /// Succeeds with `payload`.
    #[must_use]
    pub fn structured(capability: Capability, payload: serde_json::Value) -> Self {
        Self::new(capability, Script::Structured(payload))
    }

    /// Succeeds with free text.
    #[must_use]
    pub fn raw(capability: Capability, text: impl Into<String>) -> Self {
        Self::new(capability, Script::Raw(text.into()))
    }

    /// Succeeds with the canned payload wrapped in chatter and a fenced block.
    #[must_use]
    pub fn fenced(capability: Capability) -> Self {
        Self::raw(
            capability,
            format!(
                "Sure, here is the analysis.\n\n```json\n{:#}\n```\n\nHope this helps.",
                fixtures::payload_for(capability)
            ),
        )
    }

    /// Document understanding that reports `is_valid = false`.
    #[must_use]
    pub fn invalid_blueprint(errors: &[&str]) -> Self {
        Self::structured(
            Capability::DocumentUnderstanding,
            fixtures::invalid_blueprint(errors.iter().map(|e| (*e).to_string()).collect()),
        )
    }

    /// Fails with `message`.
    #[must_use]
    pub fn failing(capability: Capability, message: impl Into<String>) -> Self {
        Self::new(capability, Script::Fail(message.into()))
    }

    /// Panics with `message`.
    #[must_use]
    pub fn panicking(capability: Capability, message: impl Into<String>) -> Self {
        Self::new(capability, Script::Panic(message.into()))
    }

    /// Sleeps for `delay` before succeeding.
    #[must_use]
    pub fn slow(capability: Capability, delay: Duration) -> Self {
        Self::new(capability, Script::Slow(delay))
    }

    /// Returns the number of invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the prior-result capabilities visible on each invocation.
    #[must_use]
    pub fn seen_results(&self) -> Vec<Vec<Capability>> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Stage for ScriptedStage {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn invoke(&self, ctx: &StageContext) -> Result<StageOutput, StageExecutionFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .push(ctx.results().iter().map(|r| r.capability).collect());

        match &self.script {
            Script::Structured(payload) => Ok(StageOutput::Structured(payload.clone())),
            Script::Raw(text) => Ok(StageOutput::RawText(text.clone())),
            Script::Fail(message) => Err(StageExecutionFailure::new(
                self.capability.default_display_name(),
                message.clone(),
            )),
            Script::Panic(message) => panic!("{}", message),
            Script::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(StageOutput::Structured(fixtures::payload_for(self.capability)))
            }
        }
    }
}
