use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Full error text attached to error responses. The error details middleware
/// copies it into the body outside production and drops it otherwise.
#[derive(Clone, Debug)]
pub struct ErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, ErrorCode::RateLimited),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput),
            AppError::Undeliverable(_) => (StatusCode::BAD_REQUEST, ErrorCode::Undeliverable),
            // Handlers translate conflicts; reaching here is a bug.
            AppError::Conflict => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Conflict),
            AppError::Notification(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::NotificationFailed,
            ),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError),
        };

        // Log the error before it gets converted into a status response.
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let mut response = error_resp(status, code, self.public_message());
        response
            .extensions_mut()
            .insert(ErrorDetail(self.to_string()));
        response
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: String) -> Response {
    let body = serde_json::json!({
        "success": false,
        "code": code.as_str(),
        "error": message,
    });
    (status, Json(body)).into_response()
}
