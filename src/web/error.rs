use crate::store::error::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Store(err @ StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Store(err @ StoreError::Io { .. }) => {
                error!(error = %err, "storage I/O failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage operation failed".to_string(),
                )
            }
            Self::Store(err) => {
                error!(error = %err, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn store_errors_map_to_http_statuses() {
        let not_found = AppError::from(StoreError::NotFound(7)).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let io = AppError::from(StoreError::Io {
            path: PathBuf::from("cars.json"),
            source: std::io::Error::other("disk full"),
        })
        .into_response();
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let corrupt = AppError::from(StoreError::Corrupt {
            path: PathBuf::from("cars.json"),
            reason: "bad".to_string(),
        })
        .into_response();
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let response = AppError::validation("id must be an integer").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
