use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::manager;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] manager::Error),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::Store(manager::Error::InvalidInput(_))
            | ApiError::Store(manager::Error::InvalidOperation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(manager::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(manager::Error::StorageFailure(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store(manager::Error::StorageFailure(err)) => {
                tracing::error!(error = %err, "storage failure");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
