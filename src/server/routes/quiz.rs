use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::clients::ClientType;
use crate::quiz::Quiz;
use crate::request::QuizRequest;
use crate::server::error::Result;
use crate::server::AppState;

/// A freshly created quiz-taking session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub quiz: Quiz,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRequest {
    #[serde(default)]
    pub api_model: Option<ClientType>,
}

/// Generate a quiz and open a session for it.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<SessionCreated>> {
    let generator = state.generator(request.api_model)?;
    let quiz = generator.generate(&request).await?;
    let session_id = state.sessions.create(quiz.clone()).await;
    info!(session = %session_id, provider = %generator.client().client_type(), "quiz ready");
    Ok(Json(SessionCreated { session_id, quiz }))
}

/// Invent a random quiz request for the form.
pub async fn outline(
    State(state): State<AppState>,
    Json(request): Json<OutlineRequest>,
) -> Result<Json<QuizRequest>> {
    let outline = state.generator(request.api_model)?.outline().await?;
    Ok(Json(outline))
}
