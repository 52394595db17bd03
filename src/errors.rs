use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

/// Error returned by the scan desk handlers. The message is the response body.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "missing session token".to_string(),
        }
    }

    /// The remembered selection could not be written. The cause is logged,
    /// the operator only sees that saving failed.
    pub fn preferences(err: impl std::fmt::Display) -> Self {
        error!("failed to persist preferences: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "failed to save week and center selection".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
