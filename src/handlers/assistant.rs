use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::services::ai::{AiService, ChatTurn};
use axum::{response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MAX_TRANSCRIPT_TURNS: usize = 50;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Full client-held transcript, oldest first, ending with the new
    /// user turn. The server keeps no conversation state.
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/assistant/chat",
    security(("jwt_token" = [])),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply (a canned apology on upstream failure)", body = ChatResponse),
        (status = 400, description = "Empty or oversized transcript", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "assistant"
)]
pub async fn chat(
    Extension(ai): Extension<AiService>,
    Json(payload): Json<ChatRequest>,
) -> AppResult<impl IntoResponse> {
    if payload.messages.is_empty() {
        return Err(AppError::Validation(
            "messages must contain at least one turn".to_string(),
        ));
    }
    if payload.messages.len() > MAX_TRANSCRIPT_TURNS {
        return Err(AppError::Validation(format!(
            "transcript is limited to {MAX_TRANSCRIPT_TURNS} turns"
        )));
    }

    // Never errors past this point: upstream failure becomes an apology
    // turn, not an error status.
    let reply = ai.chat(&payload.messages).await;
    Ok(ApiResponse::ok(ChatResponse { reply }))
}
