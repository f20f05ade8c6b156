//! Error handling for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::error::{AIError, QuizError, SessionError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid content from model: {0}")]
    InvalidContent(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Provider busy: {0}")]
    RateLimited(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::InvalidContent(_) => (StatusCode::BAD_GATEWAY, "invalid_content"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ApiError::RateLimited(_) => (StatusCode::SERVICE_UNAVAILABLE, "rate_limited"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<AIError> for ApiError {
    fn from(err: AIError) -> Self {
        match err {
            AIError::NotConfigured(_) => ApiError::BadRequest(err.to_string()),
            _ if err.is_rate_limit() => ApiError::RateLimited(err.to_string()),
            _ => ApiError::Upstream(err.to_string()),
        }
    }
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::InvalidContentFormat { reason, raw } => {
                // the payload stays in the logs; clients only see the reason
                error!(%reason, raw = %raw, "model returned an invalid quiz");
                ApiError::InvalidContent(reason)
            }
            QuizError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            QuizError::Ai(e) => e.into(),
            QuizError::Serialization(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => ApiError::NotFound(err.to_string()),
            SessionError::UnknownQuestion(_) | SessionError::UnknownAnswer { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            SessionError::AlreadySubmitted => ApiError::Conflict(err.to_string()),
        }
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientType;
    use crate::error::{ClaudeError, OpenAIError};
    use crate::quiz::QuestionId;
    use uuid::Uuid;

    fn status(err: impl Into<ApiError>) -> StatusCode {
        let api: ApiError = err.into();
        api.into_response().status()
    }

    #[test]
    fn test_invalid_content_is_bad_gateway() {
        let err = QuizError::invalid("quizTitle: missing", "{}");
        assert_eq!(status(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_invalid_content_message_omits_raw() {
        let api: ApiError = QuizError::invalid("quizTitle: missing", "SECRET").into();
        assert_eq!(api.to_string(), "Invalid content from model: quizTitle: missing");
    }

    #[test]
    fn test_invalid_request_status() {
        assert_eq!(status(QuizError::InvalidRequest("quizTitle is required".into())), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_ai_error_statuses() {
        assert_eq!(status(AIError::NotConfigured(ClientType::Gemini)), StatusCode::BAD_REQUEST);
        assert_eq!(status(AIError::Claude(ClaudeError::RateLimit)), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(AIError::OpenAI(OpenAIError::Authentication)), StatusCode::BAD_GATEWAY);
        assert_eq!(status(QuizError::Ai(AIError::OpenAI(OpenAIError::Http("reset".into())))), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_session_error_statuses() {
        assert_eq!(status(SessionError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND);
        assert_eq!(status(SessionError::UnknownQuestion(QuestionId::new(3))), StatusCode::BAD_REQUEST);
        assert_eq!(status(SessionError::AlreadySubmitted), StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_display_conflict() {
        let error = ApiError::Conflict("already submitted".to_string());
        assert_eq!(error.to_string(), "Conflict: already submitted");
    }
}
