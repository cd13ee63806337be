use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tourbook_agent::TourAgent;

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery};
use crate::state::AppState;

const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct ClearQuery {
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    message: String,
    session_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/clear", post(clear_chat))
}

fn session_or_default(session_id: Option<String>) -> String {
    session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

fn agent(state: &AppState) -> Result<Arc<TourAgent>, AppError> {
    state
        .agent
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("Chat agent is not configured".to_string()))
}

async fn chat(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::ValidationError("message must not be empty".to_string()));
    }
    let agent = agent(&state)?;
    let session_id = session_or_default(req.session_id);

    let reply = agent.process(&req.message, &session_id).await;
    Ok(Json(ChatResponse {
        response: reply.output,
        session_id,
    }))
}

async fn clear_chat(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ClearQuery>,
) -> Result<Json<ClearResponse>, AppError> {
    let agent = agent(&state)?;
    let session_id = session_or_default(query.session_id);

    agent.clear_session(&session_id).await?;
    Ok(Json(ClearResponse {
        message: "Conversation history cleared".to_string(),
        session_id,
    }))
}
