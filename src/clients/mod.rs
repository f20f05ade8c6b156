pub mod claude;
pub mod flexible;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use claude::*;
pub use flexible::*;
pub use gemini::*;
pub use mock::*;
pub use openai::*;

use tracing::{error, warn};

use crate::error::{ClaudeError, GeminiError, OpenAIError};

/// How an HTTP provider call went wrong, before it is tagged with the provider.
#[derive(Debug)]
pub(crate) enum HttpFailure {
    Transport(String),
    Status(String),
    RateLimit,
    Authentication,
}

/// Map transport errors and non-success statuses onto [`HttpFailure`].
pub(crate) async fn checked_response(
    provider: &'static str,
    sent: Result<reqwest::Response, reqwest::Error>,
) -> Result<reqwest::Response, HttpFailure> {
    let response = sent.map_err(|e| {
        error!(provider, error = %e, "HTTP request failed");
        HttpFailure::Transport(e.to_string())
    })?;

    let status = response.status();
    if status == 429 {
        warn!(provider, "rate limit exceeded");
        return Err(HttpFailure::RateLimit);
    }
    if status == 401 || status == 403 {
        error!(provider, status = %status, "authentication failed");
        return Err(HttpFailure::Authentication);
    }
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(provider, status = %status, error = %error_text, "API error");
        return Err(HttpFailure::Status(format!("{status}: {error_text}")));
    }
    Ok(response)
}

macro_rules! provider_error_from_http {
    ($($err:ident),*) => {
        $(
            impl From<HttpFailure> for $err {
                fn from(failure: HttpFailure) -> Self {
                    match failure {
                        HttpFailure::Transport(msg) => Self::Http(msg),
                        HttpFailure::Status(msg) => Self::Api(msg),
                        HttpFailure::RateLimit => Self::RateLimit,
                        HttpFailure::Authentication => Self::Authentication,
                    }
                }
            }
        )*
    };
}

provider_error_from_http!(ClaudeError, GeminiError, OpenAIError);
