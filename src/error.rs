use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Request-scoped failures. Every variant ends up as an HTTP status plus a
/// `{"error": "..."}` JSON body; nothing propagates past the handler.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] redis::RedisError),

    #[error("failed to encode response: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Startup failure: the backend stayed unreachable through every attempt.
#[derive(Error, Debug)]
#[error("failed to connect to redis at {address} after {attempts} attempts: {source}")]
pub struct ConnectError {
    pub address: String,
    pub attempts: u32,
    #[source]
    pub source: redis::RedisError,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Encoding { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::CONTENT_TYPE;
    use http_body_util::BodyExt;

    use super::*;

    fn store_error() -> AppError {
        AppError::StoreUnavailable(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )))
    }

    fn encoding_error() -> AppError {
        AppError::Encoding(serde_json::from_str::<u32>("not a number").unwrap_err())
    }

    #[tokio::test]
    async fn test_store_error_maps_to_503() {
        let response = store_error().into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().contains("store unavailable"));
    }

    #[tokio::test]
    async fn test_encoding_error_maps_to_500() {
        let response = encoding_error().into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }
}
