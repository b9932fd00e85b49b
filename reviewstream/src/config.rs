//! Service configuration.
//!
//! Configuration is an explicit value built once at startup and passed to
//! the components that need it. It is layered: built-in defaults, then an
//! optional TOML file, then environment variables.
//!
//! # Configuration File Format
//!
//! ```toml
//! [app]
//! name = "System Design Mentor"
//! environment = "production"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [pipeline]
//! min_document_length = 50
//! stage_timeout_secs = 300
//!
//! [llm]
//! provider = "azure"
//! azure_endpoint = "https://example.openai.azure.com"
//! azure_deployment = "gpt-4o"
//!
//! [agents.security_review]
//! display_name = "Security Architect"
//! temperature = 0.2
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use crate::core::Capability;
use crate::errors::ReviewError;
use crate::stages::AgentProfile;
use crate::validation::{Strictness, ValidationGate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const REDACTED: &str = "********";

/// Application metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Service name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Reported version.
    pub version: String,
    /// Deployment environment.
    pub environment: String,
    /// Debug mode.
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "System Design Mentor".to_string(),
            description: "AI-powered architecture analyst".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            debug: true,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Prefix of every API route.
    pub api_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            api_prefix: "/api/v1".to_string(),
        }
    }
}

impl ServerConfig {
    /// Returns `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cross-origin settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any.
    pub origins: Vec<String>,
    /// Whether credentials are allowed.
    pub credentials: bool,
    /// Allowed methods. `*` allows any.
    pub methods: Vec<String>,
    /// Allowed headers. `*` allows any.
    pub headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec!["http://localhost:3000".to_string()],
            credentials: true,
            methods: vec!["*".to_string()],
            headers: vec!["*".to_string()],
        }
    }
}

/// Review pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum document length in characters.
    pub min_document_length: usize,
    /// Strictness marker attached to validated input.
    pub validation_strictness: Strictness,
    /// Per-stage deadline in seconds. 0 disables it.
    pub stage_timeout_secs: u64,
    /// Pause after writing a line, in milliseconds.
    pub flush_interval_ms: u64,
    /// Pause after finding the queue empty, in milliseconds.
    pub idle_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_document_length: 50,
            validation_strictness: Strictness::High,
            stage_timeout_secs: 300,
            flush_interval_ms: 10,
            idle_interval_ms: 100,
        }
    }
}

impl PipelineConfig {
    /// Returns the validation gate for these settings.
    #[must_use]
    pub fn gate(&self) -> ValidationGate {
        ValidationGate::new(self.min_document_length, self.validation_strictness)
    }

    /// Returns the per-stage deadline, if enabled.
    #[must_use]
    pub fn stage_timeout(&self) -> Option<Duration> {
        (self.stage_timeout_secs > 0).then(|| Duration::from_secs(self.stage_timeout_secs))
    }

    /// Returns the flush interval.
    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Returns the idle interval.
    #[must_use]
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

/// Which chat-completion API to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible endpoint.
    #[default]
    OpenAi,
    /// Azure OpenAI deployment.
    Azure,
}

/// Language model settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// The provider.
    pub provider: LlmProvider,
    /// Default model name.
    pub model: String,
    /// API key.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Azure resource endpoint.
    pub azure_endpoint: String,
    /// Azure deployment name.
    pub azure_deployment: String,
    /// Azure API version.
    pub azure_api_version: String,
    /// Completion token limit.
    pub max_completion_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            azure_endpoint: String::new(),
            azure_deployment: String::new(),
            azure_api_version: "2024-10-21".to_string(),
            max_completion_tokens: 4096,
        }
    }
}

impl LlmConfig {
    /// Checks that the selected provider is usable.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Config` naming the first missing setting.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.api_key.is_empty() {
            return Err(ReviewError::Config("llm.api_key is not set".to_string()));
        }
        if self.provider == LlmProvider::Azure {
            if self.azure_endpoint.is_empty() {
                return Err(ReviewError::Config("llm.azure_endpoint is not set".to_string()));
            }
            if self.azure_deployment.is_empty() {
                return Err(ReviewError::Config("llm.azure_deployment is not set".to_string()));
            }
        }
        Ok(())
    }
}

/// Per-agent settings. Unset fields fall back to the capability defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Name shown on messages.
    pub display_name: Option<String>,
    /// Text of the thinking message.
    pub thinking_style: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Nucleus sampling.
    pub top_p: Option<f32>,
    /// Model override.
    pub model: Option<String>,
}

impl AgentConfig {
    /// Default temperature when none is configured.
    pub const DEFAULT_TEMPERATURE: f32 = 0.1;
    /// Default `top_p` when none is configured.
    pub const DEFAULT_TOP_P: f32 = 1.0;
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ReviewError::Config(format!(
                "Invalid log format '{other}'. Valid values: pretty, json"
            ))),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Application metadata.
    pub app: AppConfig,
    /// HTTP listener.
    pub server: ServerConfig,
    /// Cross-origin settings.
    pub cors: CorsConfig,
    /// Pipeline settings.
    pub pipeline: PipelineConfig,
    /// Language model settings.
    pub llm: LlmConfig,
    /// Per-agent overrides.
    pub agents: BTreeMap<Capability, AgentConfig>,
    /// Logging.
    pub logging: LoggingConfig,
}

impl ReviewConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Config` if the text is not valid configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ReviewError> {
        toml::from_str(content).map_err(|e| ReviewError::Config(format!("Failed to parse config: {e}")))
    }

    /// Loads configuration from an optional file, then applies environment
    /// overrides from the process environment.
    ///
    /// A missing file falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an
    /// environment variable holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self, ReviewError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Config` if a numeric or enumerated variable
    /// cannot be parsed.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ReviewError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("APP_NAME") {
            self.app.name = v;
        }
        if let Some(v) = get("APP_DESCRIPTION") {
            self.app.description = v;
        }
        if let Some(v) = get("APP_VERSION") {
            self.app.version = v;
        }
        if let Some(v) = get("APP_ENVIRONMENT") {
            self.app.environment = v;
        }
        if let Some(v) = get("APP_DEBUG") {
            self.app.debug = parse_bool(&v);
        }

        if let Some(v) = get("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("SERVER_PORT") {
            self.server.port = parse_number("SERVER_PORT", &v)?;
        }
        if let Some(v) = get("API_V1_PREFIX") {
            self.server.api_prefix = v;
        }

        if let Some(v) = get("CORS_ORIGINS") {
            self.cors.origins = parse_list(&v);
        }
        if let Some(v) = get("CORS_CREDENTIALS") {
            self.cors.credentials = parse_bool(&v);
        }
        if let Some(v) = get("CORS_METHODS") {
            self.cors.methods = parse_list(&v);
        }
        if let Some(v) = get("CORS_HEADERS") {
            self.cors.headers = parse_list(&v);
        }

        if let Some(v) = get("USE_AZURE_OPENAI") {
            self.llm.provider = if parse_bool(&v) {
                LlmProvider::Azure
            } else {
                LlmProvider::OpenAi
            };
        }
        let key_var = match self.llm.provider {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Azure => "AZURE_API_KEY",
        };
        if let Some(v) = get(key_var) {
            self.llm.api_key = v;
        }
        if let Some(v) = get("OPENAI_MODEL_NAME") {
            self.llm.model = v;
        }
        if let Some(v) = get("AZURE_ENDPOINT") {
            self.llm.azure_endpoint = v;
        }
        if let Some(v) = get("AZURE_DEPLOYMENT_NAME") {
            self.llm.azure_deployment = v;
        }
        if let Some(v) = get("AZURE_API_VERSION") {
            self.llm.azure_api_version = v;
        }

        if let Some(v) = get("MIN_DOCUMENT_LENGTH") {
            self.pipeline.min_document_length = parse_number("MIN_DOCUMENT_LENGTH", &v)?;
        }
        if let Some(v) = get("STAGE_TIMEOUT_SECS") {
            self.pipeline.stage_timeout_secs = parse_number("STAGE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("LOG_FORMAT") {
            self.logging.format = v.parse()?;
        }

        Ok(())
    }

    /// Returns the settings of an agent, defaults filled in.
    #[must_use]
    pub fn agent(&self, capability: Capability) -> AgentConfig {
        self.agents.get(&capability).cloned().unwrap_or_default()
    }

    /// Returns how an agent presents itself.
    #[must_use]
    pub fn agent_profile(&self, capability: Capability) -> AgentProfile {
        let agent = self.agent(capability);
        AgentProfile::new(
            agent
                .display_name
                .unwrap_or_else(|| capability.default_display_name().to_string()),
            agent
                .thinking_style
                .unwrap_or_else(|| capability.default_thinking_style().to_string()),
        )
    }

    /// Returns the configuration as JSON with secrets masked.
    #[must_use]
    pub fn redacted(&self) -> serde_json::Value {
        let mut masked = self.clone();
        if !masked.llm.api_key.is_empty() {
            masked.llm.api_key = REDACTED.to_string();
        }
        serde_json::to_value(&masked).unwrap_or_default()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "t" | "y"
    )
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ReviewError> {
    value
        .trim()
        .parse()
        .map_err(|_| ReviewError::Config(format!("{key} must be a number, got '{value}'")))
}
