/// Chat endpoint delegating to the text-response collaborator
///
/// `POST /get_response` with `{"message": text}` returns `{"answer": text}`.
/// The collaborator is a black box; its failures are reported as an opaque
/// internal error.

use crate::{app::AppState, error::{ApiError, ApiResult}};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Text to respond to
    pub message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The collaborator's answer
    pub answer: String,
}

/// Delegates the query to the responder collaborator
pub async fn chat_query(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let answer = state
        .responder
        .get_response(&req.message)
        .await
        .map_err(|e| ApiError::Internal(format!("Responder failed: {}", e)))?;

    Ok(Json(ChatResponse { answer }))
}
