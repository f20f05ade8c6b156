use thiserror::Error;
use uuid::Uuid;

use crate::clients::ClientType;
use crate::quiz::QuestionId;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("AI error: {0}")]
    Ai(#[from] AIError),
    #[error("Invalid quiz content: {reason}")]
    InvalidContentFormat { reason: String, raw: String },
    #[error("Invalid quiz request: {0}")]
    InvalidRequest(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QuizError {
    pub(crate) fn invalid(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidContentFormat { reason: reason.into(), raw: raw.into() }
    }
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),
    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] OpenAIError),
    #[error("Mock client error: {0}")]
    Mock(#[from] MockError),
    #[error("Provider {0} is not configured")]
    NotConfigured(ClientType),
}

impl AIError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            Self::Claude(ClaudeError::RateLimit)
                | Self::Gemini(GeminiError::RateLimit)
                | Self::OpenAI(OpenAIError::RateLimit)
                | Self::Mock(MockError::RateLimit)
        )
    }

    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::Claude(ClaudeError::Authentication)
                | Self::Gemini(GeminiError::Authentication)
                | Self::OpenAI(OpenAIError::Authentication)
        )
    }
}

#[derive(Error, Debug)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum MockError {
    #[error("{0}")]
    Scripted(String),
    #[error("Rate limit exceeded")]
    RateLimit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),
    #[error("Question {0} does not exist in this quiz")]
    UnknownQuestion(QuestionId),
    #[error("Answer '{answer_text}' is not an option for question {question_id}")]
    UnknownAnswer { question_id: QuestionId, answer_text: String },
    #[error("Answers were already submitted")]
    AlreadySubmitted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_content_display_hides_raw_payload() {
        let err = QuizError::invalid("courseSections: must not be empty", "{\"secret\":1}");
        assert_eq!(err.to_string(), "Invalid quiz content: courseSections: must not be empty");
    }

    #[test]
    fn rate_limit_detection_covers_all_providers() {
        assert!(AIError::Claude(ClaudeError::RateLimit).is_rate_limit());
        assert!(AIError::Gemini(GeminiError::RateLimit).is_rate_limit());
        assert!(AIError::OpenAI(OpenAIError::RateLimit).is_rate_limit());
        assert!(AIError::Mock(MockError::RateLimit).is_rate_limit());
        assert!(!AIError::Mock(MockError::Scripted("boom".into())).is_rate_limit());
    }

    #[test]
    fn authentication_detection() {
        assert!(AIError::OpenAI(OpenAIError::Authentication).is_authentication());
        assert!(!AIError::OpenAI(OpenAIError::Api("x".into())).is_authentication());
    }
}
