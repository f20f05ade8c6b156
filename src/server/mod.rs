//! HTTP API over generation, sessions and media.

pub mod error;
pub mod routes;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::clients::{ClientType, FlexibleClient, MockMediaClient, OpenAIClient};
use crate::config::AppConfig;
use crate::core::{MediaClient, RetryConfig};
use crate::error::AIError;
use crate::generator::QuizGenerator;
use crate::interceptors::{FileInterceptor, Interceptor};
use crate::session::SessionStore;

use self::error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub generators: Arc<HashMap<ClientType, QuizGenerator<FlexibleClient>>>,
    pub default_provider: ClientType,
    pub media: Option<Arc<dyn MediaClient>>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(
        generators: HashMap<ClientType, QuizGenerator<FlexibleClient>>,
        default_provider: ClientType,
        media: Option<Arc<dyn MediaClient>>,
    ) -> Self {
        Self {
            generators: Arc::new(generators),
            default_provider,
            media,
            sessions: Arc::new(SessionStore::new()),
        }
    }

    /// One generator per provider with credentials. Key-less runs get mocks.
    pub fn from_config(config: &AppConfig) -> Self {
        let interceptor = config.capture_dir.as_ref().map(|dir| {
            info!(dir = %dir.display(), "capturing model exchanges");
            Arc::new(FileInterceptor::new(dir.clone())) as Arc<dyn Interceptor>
        });

        let mut providers = config.configured_providers();
        if config.default_provider == ClientType::Mock {
            providers.push(ClientType::Mock);
        }

        let mut generators = HashMap::new();
        for provider in providers {
            let client = match FlexibleClient::from_config(provider, config) {
                Ok(client) => client,
                Err(e) => {
                    warn!(%provider, error = %e, "skipping provider");
                    continue;
                }
            };
            let mut generator = QuizGenerator::new(client, RetryConfig::default());
            if let Some(interceptor) = &interceptor {
                generator = generator.with_interceptor(Arc::clone(interceptor));
            }
            generators.insert(provider, generator);
        }
        if !generators.contains_key(&config.default_provider) {
            warn!(provider = %config.default_provider, "default provider has no credentials");
        }

        let media: Option<Arc<dyn MediaClient>> = match (&config.openai, config.default_provider) {
            (Some(openai), _) => Some(Arc::new(OpenAIClient::new(openai.clone()))),
            (None, ClientType::Mock) => Some(Arc::new(MockMediaClient::new())),
            (None, _) => None,
        };

        Self::new(generators, config.default_provider, media)
            .with_sessions(SessionStore::with_ttl(config.session_ttl))
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Arc::new(sessions);
        self
    }

    /// Generator for the requested provider, or the default one.
    pub fn generator(&self, requested: Option<ClientType>) -> Result<&QuizGenerator<FlexibleClient>, ApiError> {
        let provider = requested.unwrap_or(self.default_provider);
        self.generators
            .get(&provider)
            .ok_or_else(|| AIError::NotConfigured(provider).into())
    }

    pub fn media(&self) -> Result<&dyn MediaClient, ApiError> {
        self.media
            .as_deref()
            .ok_or_else(|| AIError::NotConfigured(ClientType::OpenAI).into())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/quiz", post(routes::quiz::generate))
        .route("/api/quiz/outline", post(routes::quiz::outline))
        .route("/api/sessions", post(routes::sessions::start))
        .route(
            "/api/sessions/:id",
            get(routes::sessions::show).delete(routes::sessions::remove),
        )
        .route("/api/sessions/:id/answers", post(routes::sessions::toggle))
        .route("/api/sessions/:id/submit", post(routes::sessions::submit))
        .route("/api/sessions/:id/results", get(routes::sessions::download))
        .route("/api/tts", post(routes::media::speech))
        .route("/api/image", post(routes::media::image))
        .route("/api/modify-text", post(routes::media::modify_text))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::from_config(&config);
    info!(
        default_provider = %state.default_provider,
        providers = state.generators.len(),
        media = state.media.is_some(),
        "Application state ready"
    );

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyless_config_runs_on_mocks() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        let state = AppState::from_config(&config);
        assert_eq!(state.default_provider, ClientType::Mock);
        assert!(state.generator(None).is_ok());
        assert!(state.generator(Some(ClientType::Claude)).is_err());
        assert!(state.media().is_ok());
    }

    #[test]
    fn media_requires_openai_outside_mock_mode() {
        let config = AppConfig::from_lookup(|name| {
            (name == "GEMINI_API_KEY").then(|| "g".to_string())
        })
        .unwrap();
        let state = AppState::from_config(&config);
        assert_eq!(state.default_provider, ClientType::Gemini);
        assert!(state.generator(None).is_ok());
        assert!(state.media().is_err());
    }

    #[test]
    fn session_ttl_comes_from_config() {
        let config = AppConfig::from_lookup(|name| {
            (name == "QUIZ_SESSION_TTL_SECS").then(|| "120".to_string())
        })
        .unwrap();
        let state = AppState::from_config(&config);
        assert_eq!(state.sessions.ttl(), std::time::Duration::from_secs(120));
    }
}
