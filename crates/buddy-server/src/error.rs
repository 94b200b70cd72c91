//! Application error type and Axum response conversion.
//!
//! Any failure during request handling becomes a 500 carrying the error text
//! in the same `reply` shape the chat endpoint uses on success.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::dto::ChatReply;

use buddy_core::AgentError;

/// Application-level error converted to an HTTP 500 response.
#[derive(Debug)]
pub struct AppError(pub String);

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        AppError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("ERROR in /chat: {}", self.0);
        let reply = ChatReply {
            reply: format!("Backend error: {}", self.0),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(reply)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_app_error_maps_to_500_with_reply_body() {
        let response = AppError("LLM request failed: boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["reply"], "Backend error: LLM request failed: boom");
    }

    #[test]
    fn test_agent_error_converts_to_app_error() {
        let err: AppError = AgentError::EmptyCrew.into();
        assert_eq!(err.0, "Crew has no tasks to execute");
    }
}
