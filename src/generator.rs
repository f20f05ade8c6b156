use std::sync::Arc;

use rand::Rng;
use tracing::{error, info, instrument, warn};

use crate::core::{LowLevelClient, RetryConfig};
use crate::error::QuizError;
use crate::interceptors::Interceptor;
use crate::json_utils;
use crate::prompts;
use crate::quiz::{contract, Quiz};
use crate::request::QuizRequest;

/// Drives a [`LowLevelClient`] through quiz generation and the text helpers.
///
/// Model output is untrusted: quizzes go through the content contract and
/// outlines through [`QuizRequest::check`]. Retries happen here, around the
/// provider call, never inside validation.
#[derive(Debug, Clone)]
pub struct QuizGenerator<C: LowLevelClient> {
    client: C,
    config: RetryConfig,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> QuizGenerator<C> {
    pub fn new(client: C, config: RetryConfig) -> Self {
        info!(default_max_retries = config.default_max_retries, "Creating new QuizGenerator");
        Self { client, config, interceptor: None }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// One provider round-trip, retrying rate limits.
    async fn ask(&self, system: &str, prompt: &str) -> Result<String, QuizError> {
        let max_rate_retries = self.config.retries_for(RetryConfig::RATE_LIMIT);
        let mut attempt = 0;
        let raw = loop {
            match self.client.ask_with_system(system, prompt.to_string()).await {
                Ok(raw) => break raw,
                Err(e) if e.is_rate_limit() && attempt < max_rate_retries => {
                    attempt += 1;
                    warn!(attempt, max_rate_retries, "rate limited, backing off");
                    tokio::time::sleep(self.config.rate_limit_backoff).await;
                }
                Err(e) => {
                    error!(error = %e, "provider call failed");
                    return Err(e.into());
                }
            }
        };

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(prompt, &raw).await {
                warn!(error = %e, "failed to capture model exchange");
            }
        }
        Ok(raw)
    }

    /// Generate and validate a quiz for `request`.
    #[instrument(
        target = "quiz_generator::generator",
        skip(self, request),
        fields(title = %request.quiz_title, questions = request.total_questions())
    )]
    pub async fn generate(&self, request: &QuizRequest) -> Result<Quiz, QuizError> {
        request.check()?;
        let prompt = prompts::quiz_prompt(request);
        let max_invalid_retries = self.config.retries_for(RetryConfig::INVALID_CONTENT);
        let mut attempt = 0;

        loop {
            let raw = self.ask(prompts::QUIZ_SYSTEM, &prompt).await?;
            match contract::validate_str(&raw) {
                Ok(quiz) => {
                    info!(questions = quiz.question_count(), attempt, "quiz generated");
                    return Ok(quiz);
                }
                Err(QuizError::InvalidContentFormat { reason, .. }) if attempt < max_invalid_retries => {
                    attempt += 1;
                    warn!(%reason, attempt, max_invalid_retries, "model produced invalid quiz, asking again");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Invent a random quiz outline that can be fed straight back into [`generate`](Self::generate).
    #[instrument(target = "quiz_generator::generator", skip(self))]
    pub async fn outline(&self) -> Result<QuizRequest, QuizError> {
        let (sections, questions) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(2..=4u32), rng.gen_range(3..=6u32))
        };
        let prompt = prompts::outline_prompt(sections, questions);
        let raw = self.ask(prompts::OUTLINE_SYSTEM, &prompt).await?;

        let outline: QuizRequest = json_utils::extract_first(&raw)
            .ok_or_else(|| QuizError::invalid("outline: no quiz outline found", raw.as_str()))?;
        if let Err(QuizError::InvalidRequest(reason)) = outline.check() {
            return Err(QuizError::invalid(format!("outline: {reason}"), raw));
        }
        info!(sections = outline.course_sections.len(), "outline generated");
        Ok(outline)
    }

    /// Restyle `text` for `audience`. A blank reply leaves the text unchanged.
    #[instrument(target = "quiz_generator::generator", skip(self, text), fields(text_len = text.len()))]
    pub async fn rewrite(&self, text: &str, audience: &str) -> Result<String, QuizError> {
        let raw = self
            .ask(prompts::REWRITE_SYSTEM, &prompts::rewrite_prompt(text, audience))
            .await?;
        let rewritten = raw.trim().trim_matches('"').trim();
        if rewritten.is_empty() {
            warn!("blank rewrite, keeping original text");
            return Ok(text.to_string());
        }
        Ok(rewritten.to_string())
    }

    /// Extract a short theme from free text.
    #[instrument(target = "quiz_generator::generator", skip(self, text), fields(text_len = text.len()))]
    pub async fn theme(&self, text: &str) -> Result<String, QuizError> {
        let raw = self.ask(prompts::THEME_SYSTEM, &prompts::theme_prompt(text)).await?;
        let theme = raw.trim().trim_matches('"').trim();
        if theme.is_empty() {
            return Err(QuizError::invalid("theme: empty reply", raw.as_str()));
        }
        Ok(theme.to_string())
    }
}
