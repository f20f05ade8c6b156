use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::prompts;
use crate::server::error::{ApiError, Result};
use crate::server::AppState;

pub const DEFAULT_VOICE: &str = "coral";
pub const RANDOM_VOICES: [&str; 7] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer", "ash"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub randomize_voice: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRequest {
    #[serde(default)]
    pub user_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub theme: String,
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyTextRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub audience: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyTextResponse {
    pub modified_text: String,
}

fn choose_voice(request: &SpeechRequest) -> String {
    if request.randomize_voice {
        if let Some(voice) = RANDOM_VOICES.choose(&mut rand::thread_rng()) {
            return (*voice).to_string();
        }
    }
    request
        .voice
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VOICE)
        .to_string()
}

/// Read text aloud. Responds with MP3 audio.
pub async fn speech(State(state): State<AppState>, Json(request): Json<SpeechRequest>) -> Result<Response> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("No text provided".to_string()));
    }
    let voice = choose_voice(&request);
    let audio = state.media()?.speech(&request.text, &voice).await?;
    info!(%voice, bytes = audio.len(), "speech served");

    Ok((
        [(header::CONTENT_TYPE, "audio/mpeg"), (header::CACHE_CONTROL, "no-cache")],
        audio,
    )
        .into_response())
}

/// Pick a theme from the text and illustrate it.
pub async fn image(State(state): State<AppState>, Json(request): Json<ImageRequest>) -> Result<Json<ImageResponse>> {
    if request.user_text.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing required text input".to_string()));
    }
    let media = state.media()?;
    let theme = state.generator(None)?.theme(&request.user_text).await?;
    let image_url = media.generate_image(&prompts::image_prompt(&theme)).await?;
    Ok(Json(ImageResponse { theme, image_url }))
}

/// Restyle text in the dialect of an audience.
pub async fn modify_text(
    State(state): State<AppState>,
    Json(request): Json<ModifyTextRequest>,
) -> Result<Json<ModifyTextResponse>> {
    if request.text.trim().is_empty() || request.audience.trim().is_empty() {
        return Err(ApiError::BadRequest("Text and audience are required".to_string()));
    }
    let modified_text = state
        .generator(None)?
        .rewrite(&request.text, &request.audience)
        .await?;
    Ok(Json(ModifyTextResponse { modified_text }))
}
