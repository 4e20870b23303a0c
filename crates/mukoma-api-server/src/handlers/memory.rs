use crate::models::chat::{ClearMemoryResponse, MemoryResponse};
use crate::services::ChatGateway;
use crate::utils::error::ApiError;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

pub async fn get_memory_handler(
    State(gateway): State<Arc<ChatGateway>>,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<Json<MemoryResponse>, ApiError> {
    let Path(user_id) = user_id.map_err(|rejection| ApiError::MemoryLoad(rejection.body_text()))?;

    let conversation = gateway.history(&user_id).await;

    Ok(Json(MemoryResponse {
        success: true,
        user_id,
        conversation,
    }))
}

pub async fn clear_memory_handler(
    State(gateway): State<Arc<ChatGateway>>,
    user_id: Result<Path<String>, PathRejection>,
) -> Result<Json<ClearMemoryResponse>, ApiError> {
    let Path(user_id) = user_id.map_err(|rejection| ApiError::MemoryClear(rejection.body_text()))?;

    gateway
        .clear(&user_id)
        .await
        .map_err(|e| ApiError::MemoryClear(e.to_string()))?;

    info!("Memory cleared for user {}", user_id);

    Ok(Json(ClearMemoryResponse {
        success: true,
        user_id,
    }))
}
