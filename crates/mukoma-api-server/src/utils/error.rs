use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// HTTP-facing errors. The inner string is logged, never sent to the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid message payload: {0}")]
    InvalidPayload(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Memory load error: {0}")]
    MemoryLoad(String),

    #[error("Memory clear error: {0}")]
    MemoryClear(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Backend(_) | ApiError::MemoryLoad(_) | ApiError::MemoryClear(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Fixed message shown to the caller
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::InvalidPayload(_) => "Invalid message payload",
            ApiError::Backend(_) => "Mukoma.ai backend error",
            ApiError::MemoryLoad(_) => "Failed to load memory",
            ApiError::MemoryClear(_) => "Failed to clear memory",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InvalidPayload(msg) => tracing::warn!("Invalid message payload: {}", msg),
            ApiError::Backend(msg) => tracing::error!("Backend error: {}", msg),
            ApiError::MemoryLoad(msg) => tracing::error!("Memory load error: {}", msg),
            ApiError::MemoryClear(msg) => tracing::error!("Memory clear error: {}", msg),
        }

        let body = Json(ErrorResponse {
            success: false,
            error: self.public_message().to_string(),
        });

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_public_message() {
        let cases = [
            (ApiError::InvalidPayload("x".into()), 400, "Invalid message payload"),
            (ApiError::Backend("x".into()), 500, "Mukoma.ai backend error"),
            (ApiError::MemoryLoad("x".into()), 500, "Failed to load memory"),
            (ApiError::MemoryClear("x".into()), 500, "Failed to clear memory"),
        ];

        for (err, status, message) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.public_message(), message);
        }
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_rendered() {
        let response = ApiError::Backend("api key sk-secret rejected".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Mukoma.ai backend error");
        assert!(!String::from_utf8_lossy(&bytes).contains("sk-secret"));
    }
}
