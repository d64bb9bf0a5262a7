//! The LLM-backed agent that turns prompts into Markdown.
//!
//! [`GenerationAgent`] is the seam between the pipeline and the model
//! provider. [`ChatAgent`] speaks the chat-completions protocol of OpenAI and
//! Azure OpenAI; [`EchoAgent`] hands the prompt back for dry runs.

use crate::error::{DocgenError, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[async_trait]
pub trait GenerationAgent: Send + Sync {
    /// Sends one prompt and returns the model's Markdown answer.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Which chat-completions dialect to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAi,
    Azure,
}

impl FromStr for Provider {
    type Err = DocgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "azure" => Ok(Self::Azure),
            other => Err(DocgenError::config(format!(
                "unknown provider '{other}' (expected 'openai' or 'azure')"
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => f.write_str("openai"),
            Self::Azure => f.write_str("azure"),
        }
    }
}

/// Everything a [`ChatAgent`] needs to reach its provider.
#[derive(Clone)]
pub struct AgentConfig {
    pub provider: Provider,
    /// Endpoint root. Required for Azure; OpenAI defaults to the public API.
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    /// Azure `api-version` query parameter.
    pub api_version: Option<String>,
    /// Model name, or deployment name for Azure.
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_base: None,
            api_key: None,
            api_version: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Chat-completions client for OpenAI or Azure OpenAI.
pub struct ChatAgent {
    config: AgentConfig,
    api_key: String,
    endpoint: String,
    system_prompt: Option<String>,
    client: Client,
}

impl ChatAgent {
    /// # Errors
    ///
    /// Returns [`DocgenError::Config`] when the API key is missing, Azure is
    /// selected without an endpoint, or the HTTP client cannot be built.
    pub fn new(config: AgentConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DocgenError::config("no API key given (use --api-key or REPODOC_API_KEY)")
            })?;
        let endpoint = endpoint_url(&config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocgenError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            api_key,
            endpoint,
            system_prompt: None,
            client,
        })
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        // Azure routes by deployment in the URL.
        let model = match self.config.provider {
            Provider::OpenAi => Some(self.config.model.as_str()),
            Provider::Azure => None,
        };

        ChatRequest {
            model,
            temperature: self.config.temperature,
            messages,
        }
    }
}

#[async_trait]
impl GenerationAgent for ChatAgent {
    async fn generate(&self, prompt: &str) -> Result<String> {
        info!(
            "Requesting completion from {} ({})",
            self.config.provider, self.config.model
        );
        debug!("Prompt is {} bytes", prompt.len());

        let request = self.client.post(&self.endpoint).json(&self.request_body(prompt));
        let request = match self.config.provider {
            Provider::OpenAi => request.bearer_auth(&self.api_key),
            Provider::Azure => request.header("api-key", &self.api_key),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DocgenError::generation(format!(
                    "request to {} timed out after {}s",
                    self.endpoint, self.config.timeout_secs
                ))
            } else {
                DocgenError::generation(format!("request to {} failed: {e}", self.endpoint))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DocgenError::generation(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(DocgenError::generation(format!(
                "provider returned {status}: {body}"
            )));
        }

        parse_completion(&body)
    }
}

/// Builds the chat-completions URL for `config`.
pub fn endpoint_url(config: &AgentConfig) -> Result<String> {
    match config.provider {
        Provider::OpenAi => {
            let base = config.api_base.as_deref().unwrap_or(DEFAULT_OPENAI_BASE);
            Ok(format!("{}/chat/completions", base.trim_end_matches('/')))
        }
        Provider::Azure => {
            let base = config.api_base.as_deref().ok_or_else(|| {
                DocgenError::config("Azure requires --api-base or REPODOC_API_BASE")
            })?;
            let version = config
                .api_version
                .as_deref()
                .unwrap_or(DEFAULT_AZURE_API_VERSION);
            Ok(format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base.trim_end_matches('/'),
                config.model,
                version
            ))
        }
    }
}

/// Pulls the first choice's text out of a chat-completions response body.
pub fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| DocgenError::generation(format!("unexpected response format: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| DocgenError::generation("provider returned no content"))
}

/// Returns the prompt unchanged, for inspecting what would be sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoAgent;

#[async_trait]
impl GenerationAgent for EchoAgent {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }
}
