//! Chat-completion backed stages.

use super::{instructions, Stage, StageContext, StageOutput};
use crate::config::{AgentConfig, LlmConfig, LlmProvider, ReviewConfig};
use crate::core::Capability;
use crate::errors::{ReviewError, StageExecutionFailure};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Sampling settings for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    /// Model name. Ignored by Azure, which routes by deployment.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling.
    pub top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    top_p: f32,
    max_completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible or Azure chat-completion API.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Creates a client for the configured provider.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Config` if the provider settings are incomplete
    /// or the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self, ReviewError> {
        config.validate()?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ReviewError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Returns the chat-completion URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        match self.config.provider {
            LlmProvider::OpenAi => format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ),
            LlmProvider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.config.azure_endpoint.trim_end_matches('/'),
                self.config.azure_deployment,
                self.config.azure_api_version
            ),
        }
    }

    /// Returns the per-agent settings, falling back to the client defaults.
    #[must_use]
    pub fn settings_for(&self, agent: &AgentConfig) -> ChatSettings {
        ChatSettings {
            model: agent.model.clone().unwrap_or_else(|| self.config.model.clone()),
            temperature: agent.temperature.unwrap_or(AgentConfig::DEFAULT_TEMPERATURE),
            top_p: agent.top_p.unwrap_or(AgentConfig::DEFAULT_TOP_P),
        }
    }

    fn request_body<'a>(
        &'a self,
        settings: &'a ChatSettings,
        system: &'a str,
        user: &'a str,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: (self.config.provider == LlmProvider::OpenAi).then_some(settings.model.as_str()),
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_completion_tokens: self.config.max_completion_tokens,
        }
    }

    /// Sends one system/user exchange and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns a `StageExecutionFailure` attributed to `stage` on transport
    /// errors, non-success statuses and empty replies. 429 and 5xx are
    /// marked retryable.
    pub async fn complete(
        &self,
        stage: &str,
        settings: &ChatSettings,
        system: &str,
        user: &str,
    ) -> Result<String, StageExecutionFailure> {
        let request = self.http.post(self.endpoint());
        let request = match self.config.provider {
            LlmProvider::OpenAi => request.bearer_auth(&self.config.api_key),
            LlmProvider::Azure => request.header("api-key", &self.config.api_key),
        };

        let response = request
            .json(&self.request_body(settings, system, user))
            .send()
            .await
            .map_err(|e| {
                let failure = StageExecutionFailure::new(stage, format!("request failed: {e}"));
                if e.is_timeout() || e.is_connect() {
                    failure.retryable()
                } else {
                    failure
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let failure = StageExecutionFailure::new(stage, format!("API returned {status}: {body}"));
            return Err(if is_retryable(status) { failure.retryable() } else { failure });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| StageExecutionFailure::new(stage, format!("unreadable response: {e}")))?;

        first_content(reply).ok_or_else(|| StageExecutionFailure::new(stage, "empty completion"))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn first_content(reply: ChatResponse) -> Option<String> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
}

/// A stage that asks the language model for its capability's output.
///
/// The reply is returned as raw text; the translator recovers the JSON.
#[derive(Debug, Clone)]
pub struct LlmStage {
    capability: Capability,
    name: String,
    settings: ChatSettings,
    client: Arc<LlmClient>,
}

impl LlmStage {
    /// Creates a stage with explicit settings.
    #[must_use]
    pub fn new(
        capability: Capability,
        name: impl Into<String>,
        settings: ChatSettings,
        client: Arc<LlmClient>,
    ) -> Self {
        Self {
            capability,
            name: name.into(),
            settings,
            client,
        }
    }

    /// Creates a stage configured from the agent section of `config`.
    #[must_use]
    pub fn from_config(capability: Capability, client: Arc<LlmClient>, config: &ReviewConfig) -> Self {
        let settings = client.settings_for(&config.agent(capability));
        let name = config.agent_profile(capability).display_name;
        Self::new(capability, name, settings, client)
    }

    /// One stage per capability, in pipeline order.
    #[must_use]
    pub fn all(client: &Arc<LlmClient>, config: &ReviewConfig) -> Vec<Arc<dyn Stage>> {
        Capability::ALL
            .into_iter()
            .map(|capability| {
                Arc::new(Self::from_config(capability, Arc::clone(client), config)) as Arc<dyn Stage>
            })
            .collect()
    }

    /// Returns the sampling settings.
    #[must_use]
    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }
}

#[async_trait]
impl Stage for LlmStage {
    fn capability(&self) -> Capability {
        self.capability
    }

    async fn invoke(&self, ctx: &StageContext) -> Result<StageOutput, StageExecutionFailure> {
        let (system, user) = instructions(ctx);
        debug!(
            capability = %self.capability,
            model = %self.settings.model,
            prompt_chars = user.len(),
            "Requesting completion"
        );

        let text = self.client.complete(&self.name, &self.settings, &system, &user).await?;
        Ok(StageOutput::RawText(text))
    }
}
