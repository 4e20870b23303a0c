use crate::models::chat::{ChatReply, ChatRequest, ChatTurnRequest};
use crate::services::ChatGateway;
use crate::utils::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub async fn chat_handler(
    State(gateway): State<Arc<ChatGateway>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::InvalidPayload(rejection.body_text()))?;

    if !body.is_object() {
        return Err(ApiError::InvalidPayload(format!("expected a JSON object, got {}", body)));
    }

    let raw: ChatRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
    let request = ChatTurnRequest::try_from(raw)
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?;

    info!(
        "Chat request: user={}, persona={:?}, language={:?}, message_len={}",
        request.user_id,
        request.persona,
        request.language,
        request.message.len()
    );

    let reply = gateway
        .handle(request)
        .await
        .map_err(|e| ApiError::Backend(e.to_string()))?;

    Ok(Json(ChatReply {
        success: true,
        reply,
    }))
}
