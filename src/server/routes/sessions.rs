use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::quiz::SessionCreated;
use crate::export::ResultsExport;
use crate::quiz::{self, QuestionId, Quiz};
use crate::scoring::{ScoredResult, UserAnswerSet};
use crate::server::error::{ApiError, Result};
use crate::server::AppState;
use crate::session::{Selection, SessionState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: SessionState,
    pub quiz: Quiz,
    pub answers: UserAnswerSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoredResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub question_id: QuestionId,
    pub answer_text: String,
}

/// Open a session for a quiz supplied by the caller. The payload goes through
/// the same contract as generated content.
pub async fn start(State(state): State<AppState>, Json(payload): Json<Value>) -> Result<Json<SessionCreated>> {
    let quiz = quiz::validate(&payload)?;
    let session_id = state.sessions.create(quiz.clone()).await;
    Ok(Json(SessionCreated { session_id, quiz }))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionView>> {
    let session = state.sessions.get(id).await?;
    Ok(Json(SessionView {
        session_id: id,
        state: session.state(),
        answers: session.answers().clone(),
        result: session.result().cloned(),
        quiz: session.quiz().clone(),
    }))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<Selection>> {
    let selection = state
        .sessions
        .toggle(id, request.question_id, &request.answer_text)
        .await?;
    Ok(Json(selection))
}

pub async fn submit(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ScoredResult>> {
    Ok(Json(state.sessions.submit(id).await?))
}

/// Scored result as a dated JSON attachment.
pub async fn download(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let session = state.sessions.get(id).await?;
    let result = session
        .result()
        .ok_or_else(|| ApiError::Conflict("answers have not been submitted yet".to_string()))?;
    let export = ResultsExport::today(result)?;

    Ok((
        [
            (header::CONTENT_TYPE, ResultsExport::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, export.content_disposition()),
        ],
        export.body,
    )
        .into_response())
}
