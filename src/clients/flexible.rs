use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ClaudeClient, GeminiClient, MockClient, MockHandle, OpenAIClient};
use crate::config::AppConfig;
use crate::core::LowLevelClient;
use crate::error::AIError;

/// Text provider selector, also accepted as `apiModel` in quiz requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    Claude,
    Gemini,
    OpenAI,
    Mock,
}

impl ClientType {
    pub const ALL: [ClientType; 4] = [Self::Claude, Self::Gemini, Self::OpenAI, Self::Mock];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for ClientType {
    type Err = String;

    /// Parse client type from string (case insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("Unknown client type: '{s}'. Supported: claude, gemini, openai, mock"))
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any [`LowLevelClient`] behind one cheaply clonable type.
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    client_type: ClientType,
    inner: Arc<dyn LowLevelClient>,
}

impl FlexibleClient {
    pub fn new(client_type: ClientType, client: Box<dyn LowLevelClient>) -> Self {
        Self { client_type, inner: Arc::from(client) }
    }

    /// Build the client for `client_type` from loaded configuration.
    pub fn from_config(client_type: ClientType, config: &AppConfig) -> Result<Self, AIError> {
        let client: Box<dyn LowLevelClient> = match client_type {
            ClientType::Claude => Box::new(ClaudeClient::new(
                config.claude.clone().ok_or(AIError::NotConfigured(client_type))?,
            )),
            ClientType::Gemini => Box::new(GeminiClient::new(
                config.gemini.clone().ok_or(AIError::NotConfigured(client_type))?,
            )),
            ClientType::OpenAI => Box::new(OpenAIClient::new(
                config.openai.clone().ok_or(AIError::NotConfigured(client_type))?,
            )),
            ClientType::Mock => Box::new(MockClient::new().0),
        };
        Ok(Self::new(client_type, client))
    }

    /// A mock-backed client plus the handle that scripts it.
    pub fn mock() -> (Self, Arc<MockHandle>) {
        let (client, handle) = MockClient::new();
        (Self::new(ClientType::Mock, Box::new(client)), handle)
    }

    pub fn client_type(&self) -> ClientType {
        self.client_type
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.inner.ask_raw(prompt).await
    }

    async fn ask_with_system(&self, system: &str, prompt: String) -> Result<String, AIError> {
        self.inner.ask_with_system(system, prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}
