//! Axum route handlers for interview prep and voice-interview sessions.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::RequestToken;
use crate::interview::chat::answer_question;
use crate::interview::feedback::TranscriptTurn;
use crate::interview::questions::{profile_request, topic_request, CandidateProfile, QaPair};
use crate::interview::session::{
    start_feedback, FeedbackView, InterviewSession, SessionView, MAX_TRANSCRIPT_TURNS,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TopicQaRequest {
    pub topic: String,
    pub num_questions: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub position: String,
    pub questions: Vec<QaPair>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub first_message: String,
    pub assistant_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub turns: usize,
}

#[derive(Debug, Serialize)]
pub struct FeedbackAccepted {
    pub request_id: RequestToken,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    /// Long-poll: wait up to this long for a pending request to settle.
    #[serde(default)]
    pub wait_ms: u64,
}

/// Upper bound for `wait_ms`.
const MAX_FEEDBACK_WAIT_MS: u64 = 30_000;

// ────────────────────────────────────────────────────────────────────────────
// Question generation
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interview/qa
pub async fn handle_topic_qa(
    State(state): State<AppState>,
    Json(request): Json<TopicQaRequest>,
) -> Result<Json<Vec<QaPair>>, AppError> {
    let generation = topic_request(&request.topic, request.num_questions)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let pairs = state.orchestrator.run_typed(&generation).await?;
    Ok(Json(pairs))
}

/// POST /api/v1/interview/questions
pub async fn handle_profile_questions(
    State(state): State<AppState>,
    Json(profile): Json<CandidateProfile>,
) -> Result<Json<Vec<QaPair>>, AppError> {
    let generation =
        profile_request(&profile).map_err(|e| AppError::Validation(e.to_string()))?;
    let pairs = state.orchestrator.run_typed(&generation).await?;
    Ok(Json(pairs))
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let answer = answer_question(&state.orchestrator, &request.question).await?;
    Ok(Json(ChatResponse { answer }))
}

// ────────────────────────────────────────────────────────────────────────────
// Sessions
// ────────────────────────────────────────────────────────────────────────────

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<InterviewSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))
}

/// POST /api/v1/interview/sessions
///
/// Registers a session and returns the voice assistant's opening line and
/// system prompt.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    if request.name.trim().is_empty() || request.position.trim().is_empty() {
        return Err(AppError::Validation(
            "name and position are required".to_string(),
        ));
    }
    if request.questions.is_empty() {
        return Err(AppError::Validation(
            "at least one question is required".to_string(),
        ));
    }

    let session = InterviewSession::new(request.name, request.position, request.questions);
    let assistant_prompt = session.assistant_prompt(&state.orchestrator)?;
    let first_message = session.first_message();
    let session = state.sessions.insert(session).await;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
            first_message,
            assistant_prompt,
        }),
    ))
}

/// GET /api/v1/interview/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.view().await))
}

/// POST /api/v1/interview/sessions/:id/transcript
pub async fn handle_append_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(turn): Json<TranscriptTurn>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let turns = session.record_turn(turn).await.ok_or_else(|| {
        AppError::Validation(format!(
            "Transcript is limited to {MAX_TRANSCRIPT_TURNS} turns"
        ))
    })?;
    Ok(Json(TranscriptResponse { turns }))
}

/// DELETE /api/v1/interview/sessions/:id
///
/// Ends the session. A pending feedback request runs to completion and is dropped.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))?;
    session.feedback().cancel();
    info!("Interview session {id} ended");
    Ok(StatusCode::NO_CONTENT)
}

async fn begin_feedback(
    state: AppState,
    id: Uuid,
    retry: bool,
) -> Result<(StatusCode, Json<FeedbackAccepted>), AppError> {
    let session = find_session(&state, id).await?;
    let (request_id, _) = start_feedback(state.orchestrator.clone(), session, retry)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(FeedbackAccepted {
            request_id,
            status: "pending",
        }),
    ))
}

/// GET /api/v1/interview/sessions/:id/feedback?wait_ms=
///
/// With `wait_ms` set, a pending request is awaited for up to that long
/// (capped at 30s) before the current state is returned.
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<FeedbackQuery>,
) -> Result<Json<FeedbackView>, AppError> {
    let session = find_session(&state, id).await?;
    let wait = Duration::from_millis(query.wait_ms.min(MAX_FEEDBACK_WAIT_MS));
    let current = if wait.is_zero() {
        session.feedback().snapshot()
    } else {
        tokio::time::timeout(wait, session.feedback().settled())
            .await
            .unwrap_or_else(|_| session.feedback().snapshot())
    };
    Ok(Json(FeedbackView::from(current)))
}

/// POST /api/v1/interview/sessions/:id/feedback
///
/// 409 while a feedback request is pending or a previous result is still held.
pub async fn handle_request_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<FeedbackAccepted>), AppError> {
    begin_feedback(state, id, false).await
}

/// POST /api/v1/interview/sessions/:id/feedback/retry
pub async fn handle_retry_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<FeedbackAccepted>), AppError> {
    begin_feedback(state, id, true).await
}

/// DELETE /api/v1/interview/sessions/:id/feedback
pub async fn handle_cancel_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelResponse>, AppError> {
    let session = find_session(&state, id).await?;
    Ok(Json(CancelResponse {
        cancelled: session.feedback().cancel(),
    }))
}

/// POST /api/v1/interview/sessions/:id/feedback/reset
pub async fn handle_reset_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackView>, AppError> {
    let session = find_session(&state, id).await?;
    session.feedback().reset();
    Ok(Json(FeedbackView::from(session.feedback().snapshot())))
}
