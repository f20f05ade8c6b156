use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::checked_response;
use crate::config::{KeyFromEnv, DEFAULT_MAX_TOKENS};
use crate::core::LowLevelClient;
use crate::error::{AIError, ClaudeError};

pub const CLAUDE_API_URL: &str = "https://api.anthropic.com";
pub const CLAUDE_DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl ClaudeConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: CLAUDE_DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: CLAUDE_API_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Anthropic Messages API client.
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    config: ClaudeConfig,
    client: Client,
}

impl KeyFromEnv for ClaudeClient {
    const KEY_NAME: &'static str = "ANTHROPIC_API_KEY";
    const FALLBACK_KEY_NAMES: &'static [&'static str] = &["CLAUDE_API_KEY"];
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Self {
        info!(model = %config.model, "Creating new Claude client");
        Self { config, client: Client::new() }
    }

    pub fn config(&self) -> &ClaudeConfig {
        &self.config
    }

    async fn send(&self, system: Option<&str>, prompt: String) -> Result<String, ClaudeError> {
        let request = ClaudeRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system,
            messages: vec![ClaudeMessage { role: "user", content: prompt }],
        };

        debug!("Sending request to Anthropic API");
        let sent = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await;
        let response = checked_response("claude", sent).await?;

        let parsed: ClaudeResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Claude response JSON");
            ClaudeError::Http(e.to_string())
        })?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        if text.is_empty() {
            error!("No text content in Claude response");
            return Err(ClaudeError::Api("No text content in response".to_string()));
        }

        info!(response_len = text.len(), "Successfully received Claude response");
        Ok(text)
    }
}

#[async_trait]
impl LowLevelClient for ClaudeClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        Ok(self.send(None, prompt).await?)
    }

    #[instrument(skip(self, system, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_with_system(&self, system: &str, prompt: String) -> Result<String, AIError> {
        Ok(self.send(Some(system), prompt).await?)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
