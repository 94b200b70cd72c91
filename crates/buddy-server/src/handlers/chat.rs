//! Chat endpoint: wraps the user message in a task and runs the crew.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use tracing::info;

use buddy_engine::{Crew, Process, Task};

use crate::dto::{ChatReply, ChatRequest};
use crate::error::AppError;
use crate::ServerState;

/// Accepts `{"message": ...}` and returns `{"reply": ...}`.
///
/// The body rejection is taken as a `Result` so a malformed body flows
/// through the same error response as any other failure.
pub async fn chat(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(req) = payload.map_err(|e| AppError(e.body_text()))?;

    info!(
        "Chat request: {}...",
        req.message.get(..50).unwrap_or(&req.message)
    );

    let task = Task::new(
        format!(
            "User says: {}. Respond kindly and give helpful advice.",
            req.message
        ),
        "A kind, supportive, and helpful response.",
    );

    let crew = Crew::new(
        vec![state.agent.clone()],
        vec![task],
        Process::Sequential,
        state.model.clone(),
        state.api_key.clone(),
        Arc::clone(&state.tool_registry),
    );

    let result = crew.kickoff().await?;

    Ok(Json(ChatReply { reply: result.raw }))
}
