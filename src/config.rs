use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::clients::{ClaudeClient, ClaudeConfig, ClientType, GeminiClient, GeminiConfig, OpenAIClient, OpenAIConfig};
use crate::session::DEFAULT_SESSION_TTL;

/// Trait for types that can retrieve their API key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Older names still honoured, checked after `KEY_NAME`
    const FALLBACK_KEY_NAMES: &'static [&'static str] = &[];

    /// Find the API key by checking `.env` and the process environment
    fn find_key() -> Option<String> {
        // Silently ignore a missing .env file
        let _ = dotenvy::dotenv();
        Self::find_key_with(|name| env::var(name).ok())
    }

    /// Find the API key through an arbitrary lookup. Blank values count as unset.
    fn find_key_with(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        std::iter::once(Self::KEY_NAME)
            .chain(Self::FALLBACK_KEY_NAMES.iter().copied())
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid { name: &'static str, expected: &'static str, value: String },
}

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Runtime configuration for the quiz server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub default_provider: ClientType,
    pub claude: Option<ClaudeConfig>,
    pub gemini: Option<GeminiConfig>,
    pub openai: Option<OpenAIConfig>,
    /// When set, every prompt and raw reply is saved here.
    pub capture_dir: Option<PathBuf>,
    /// Idle time after which a quiz session is dropped.
    pub session_ttl: Duration,
}

impl AppConfig {
    /// Load from `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a port number",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let max_tokens = match var("QUIZ_MAX_TOKENS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "QUIZ_MAX_TOKENS",
                expected: "a positive integer",
                value: raw,
            })?,
            None => DEFAULT_MAX_TOKENS,
        };

        let session_ttl = match var("QUIZ_SESSION_TTL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "QUIZ_SESSION_TTL_SECS",
                        expected: "a positive number of seconds",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_SESSION_TTL,
        };

        let claude = ClaudeClient::find_key_with(&lookup).map(|api_key| {
            let mut config = ClaudeConfig::new(api_key).with_max_tokens(max_tokens);
            if let Some(model) = var("CLAUDE_MODEL") {
                config.model = model;
            }
            config
        });
        let gemini = GeminiClient::find_key_with(&lookup).map(|api_key| {
            let mut config = GeminiConfig::new(api_key).with_max_tokens(max_tokens);
            if let Some(model) = var("GEMINI_MODEL") {
                config.model = model;
            }
            config
        });
        let openai = OpenAIClient::find_key_with(&lookup).map(|api_key| {
            let mut config = OpenAIConfig::new(api_key).with_max_tokens(max_tokens);
            if let Some(model) = var("OPENAI_MODEL") {
                config.model = model;
            }
            config
        });

        let default_provider = match var("QUIZ_PROVIDER") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "QUIZ_PROVIDER",
                expected: "one of claude, gemini, openai, mock",
                value: raw,
            })?,
            None if claude.is_some() => ClientType::Claude,
            None if gemini.is_some() => ClientType::Gemini,
            None if openai.is_some() => ClientType::OpenAI,
            None => ClientType::Mock,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            default_provider,
            claude,
            gemini,
            openai,
            capture_dir: var("QUIZ_CAPTURE_DIR").map(PathBuf::from),
            session_ttl,
        })
    }

    /// Providers with credentials, in preference order. Mock is never listed.
    pub fn configured_providers(&self) -> Vec<ClientType> {
        let mut providers = Vec::new();
        if self.claude.is_some() {
            providers.push(ClientType::Claude);
        }
        if self.gemini.is_some() {
            providers.push(ClientType::Gemini);
        }
        if self.openai.is_some() {
            providers.push(ClientType::OpenAI);
        }
        providers
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
