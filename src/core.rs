use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::AIError;

/// A text-completion provider. Everything above this trait is provider-agnostic.
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    /// The only method that implementations must provide
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    /// Ask with a system instruction. Providers without a system slot get it prepended.
    async fn ask_with_system(&self, system: &str, prompt: String) -> Result<String, AIError> {
        self.ask_raw(format!("{system}\n\n{prompt}")).await
    }

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;
}

impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    async fn ask_with_system(&self, system: &str, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_with_system(system, prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }
}

/// Speech and image generation, used by the read-aloud and theme-image features.
#[async_trait]
pub trait MediaClient: Send + Sync + Debug {
    /// Synthesize `text` with the named voice. Returns MP3 bytes.
    async fn speech(&self, text: &str, voice: &str) -> Result<Bytes, AIError>;

    /// Generate one image and return its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, AIError>;
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: HashMap<String, usize>,
    pub default_max_retries: usize,
    /// Pause before retrying a rate-limited call.
    pub rate_limit_backoff: Duration,
}

impl RetryConfig {
    pub const RATE_LIMIT: &'static str = "rate_limit";
    pub const INVALID_CONTENT: &'static str = "invalid_content";

    pub fn retries_for(&self, kind: &str) -> usize {
        self.max_retries.get(kind).copied().unwrap_or(self.default_max_retries)
    }

    /// No retries and no waiting.
    pub fn none() -> Self {
        Self {
            max_retries: HashMap::new(),
            default_max_retries: 0,
            rate_limit_backoff: Duration::ZERO,
        }
    }

    pub fn with_retries(mut self, kind: &str, retries: usize) -> Self {
        self.max_retries.insert(kind.to_string(), retries);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        let mut max_retries = HashMap::new();
        max_retries.insert(Self::RATE_LIMIT.to_string(), 1);
        max_retries.insert(Self::INVALID_CONTENT.to_string(), 1);

        Self {
            max_retries,
            default_max_retries: 0,
            rate_limit_backoff: Duration::from_secs(2),
        }
    }
}
