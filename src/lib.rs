pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod generator;
pub mod interceptors;
pub mod json_utils;
pub mod prompts;
pub mod quiz;
pub mod request;
pub mod scoring;
pub mod server;
pub mod session;

// Convenient re-exports
pub use config::AppConfig;
pub use error::{AIError, QuizError, SessionError};
pub use generator::QuizGenerator;
pub use quiz::{validate, validate_str, Quiz};
pub use request::QuizRequest;
pub use scoring::{score, ScoredResult, UserAnswerSet};
