use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::core::{LowLevelClient, MediaClient};
use crate::error::{AIError, MockError};

/// Reply used once the script runs dry.
pub const MOCK_FALLBACK_REPLY: &str = "{}";
pub const MOCK_AUDIO: &[u8] = b"ID3mock-audio";
pub const MOCK_IMAGE_URL: &str = "https://images.invalid/mock.png";

/// One scripted outcome for a mock call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(String),
    RateLimited,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Controls a [`MockClient`] from the outside: queue replies, inspect prompts.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.push(MockResponse::Success(text.into()));
    }

    /// Every prompt received so far, system text included.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }

    fn next(&self, prompt: String) -> Result<String, AIError> {
        lock(&self.prompts).push(prompt);
        match lock(&self.responses).pop_front() {
            Some(MockResponse::Success(text)) => Ok(text),
            Some(MockResponse::Error(message)) => Err(MockError::Scripted(message).into()),
            Some(MockResponse::RateLimited) => Err(MockError::RateLimit.into()),
            None => Ok(MOCK_FALLBACK_REPLY.to_string()),
        }
    }
}

/// Scripted text client for tests and key-less local runs.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: Arc::clone(&handle) }, handle)
    }

    pub fn with_responses(responses: impl IntoIterator<Item = MockResponse>) -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        for response in responses {
            handle.push(response);
        }
        (client, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        debug!(prompt_len = prompt.len(), remaining = self.handle.remaining(), "mock call");
        self.handle.next(prompt)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

/// Media client that returns fixed audio and a fixed image URL.
#[derive(Debug, Default)]
pub struct MockMediaClient {
    voices: Mutex<Vec<String>>,
    image_prompts: Mutex<Vec<String>>,
}

impl MockMediaClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Voices requested so far, in call order.
    pub fn voices(&self) -> Vec<String> {
        lock(&self.voices).clone()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        lock(&self.image_prompts).clone()
    }
}

#[async_trait]
impl MediaClient for MockMediaClient {
    async fn speech(&self, _text: &str, voice: &str) -> Result<Bytes, AIError> {
        lock(&self.voices).push(voice.to_string());
        Ok(Bytes::from_static(MOCK_AUDIO))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, AIError> {
        lock(&self.image_prompts).push(prompt.to_string());
        Ok(MOCK_IMAGE_URL.to_string())
    }
}
