use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error taxonomy. Everything a handler can fail with maps onto
/// one of these, and `IntoResponse` turns them into the JSON shapes the
/// clients expect.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// Login rejection. Rendered as a bare `{"error": ...}` body, the shape
    /// the login endpoints have always produced.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Any other credential failure, e.g. a wrong current password on a
    /// password change.
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(m) => fail(StatusCode::BAD_REQUEST, &m),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response(),
            AppError::Auth(m) => fail(StatusCode::UNAUTHORIZED, &m),
            AppError::NotFound(m) => fail(StatusCode::NOT_FOUND, &m),
            AppError::Conflict(m) => fail(StatusCode::BAD_REQUEST, &m),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_renders_failure_envelope() {
        let resp = AppError::Validation("title is required".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "title is required");
    }

    #[tokio::test]
    async fn login_rejection_uses_bare_error_shape() {
        let resp = AppError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid credentials");
        assert!(body.get("success").is_none());
    }
}
