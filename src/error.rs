use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradeError {
    #[error("Not found")]
    NotFound,
    #[error("No valid scores found")]
    NoValidScores,
    #[error("aggregation failed: {0}")]
    AggregationFailure(String),
}

/// Failure of a single request. Bodies are plain text; store errors are
/// logged and replaced by a generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid ID format")]
    InvalidId,
    #[error("{0}")]
    BadRequest(String),
    #[error("Not found")]
    NotFound,
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::InvalidId => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Grade(GradeError::NotFound) | ApiError::Grade(GradeError::NoValidScores) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Grade(GradeError::AggregationFailure(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error calculating statistics".to_string(),
            ),
            ApiError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Seems like we messed up somewhere...".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, message).into_response()
    }
}
