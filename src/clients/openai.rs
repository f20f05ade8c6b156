use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::checked_response;
use crate::config::{KeyFromEnv, DEFAULT_MAX_TOKENS};
use crate::core::{LowLevelClient, MediaClient};
use crate::error::{AIError, OpenAIError};

pub const OPENAI_API_URL: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const OPENAI_SPEECH_MODEL: &str = "tts-1";
pub const OPENAI_IMAGE_MODEL: &str = "dall-e-3";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

/// Configuration for OpenAI client
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub speech_model: String,
    pub image_model: String,
    pub image_size: String,
    pub base_url: String,
}

impl OpenAIConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: OPENAI_DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.7,
            speech_model: OPENAI_SPEECH_MODEL.to_string(),
            image_model: OPENAI_IMAGE_MODEL.to_string(),
            image_size: "1024x1024".to_string(),
            base_url: OPENAI_API_URL.to_string(),
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

/// OpenAI client: chat completions for text, plus speech and image generation.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    config: OpenAIConfig,
    client: Client,
}

impl KeyFromEnv for OpenAIClient {
    const KEY_NAME: &'static str = "OPENAI_API_KEY";
}

impl OpenAIClient {
    pub fn new(config: OpenAIConfig) -> Self {
        info!(model = %config.model, "Creating new OpenAI client");
        Self { config, client: Client::new() }
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.config.base_url, path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    async fn chat(&self, system: Option<&str>, prompt: String) -> Result<String, OpenAIError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage { role: "system", content: system.to_string() });
        }
        messages.push(ChatMessage { role: "user", content: prompt });

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to OpenAI chat completions");
        let sent = self.post("/v1/chat/completions").json(&request).send().await;
        let response = checked_response("openai", sent).await?;

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse OpenAI response JSON");
            OpenAIError::Http(e.to_string())
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                error!("No choices in OpenAI response");
                OpenAIError::Api("No choices in response".to_string())
            })?;

        info!(response_len = text.len(), "Successfully received OpenAI response");
        Ok(text)
    }
}

#[async_trait]
impl LowLevelClient for OpenAIClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        Ok(self.chat(None, prompt).await?)
    }

    #[instrument(skip(self, system, prompt), fields(prompt_len = prompt.len(), model = %self.config.model))]
    async fn ask_with_system(&self, system: &str, prompt: String) -> Result<String, AIError> {
        Ok(self.chat(Some(system), prompt).await?)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl MediaClient for OpenAIClient {
    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.config.speech_model))]
    async fn speech(&self, text: &str, voice: &str) -> Result<Bytes, AIError> {
        let request = SpeechRequest { model: &self.config.speech_model, voice, input: text };
        let sent = self.post("/v1/audio/speech").json(&request).send().await;
        let response = checked_response("openai", sent).await.map_err(OpenAIError::from)?;

        let audio = response.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read speech audio");
            OpenAIError::Http(e.to_string())
        })?;
        info!(bytes = audio.len(), voice, "Speech generated");
        Ok(audio)
    }

    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.image_model))]
    async fn generate_image(&self, prompt: &str) -> Result<String, AIError> {
        let request = ImageRequest {
            model: &self.config.image_model,
            prompt,
            n: 1,
            size: &self.config.image_size,
        };
        let sent = self.post("/v1/images/generations").json(&request).send().await;
        let response = checked_response("openai", sent).await.map_err(OpenAIError::from)?;

        let parsed: ImageResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse image response JSON");
            OpenAIError::Http(e.to_string())
        })?;

        let url = parsed
            .data
            .into_iter()
            .find_map(|image| image.url)
            .ok_or_else(|| OpenAIError::Api("No image URL in response".to_string()))?;
        info!("Image generated");
        Ok(url)
    }
}
