/**
 * Error Conversion
 *
 * All backend errors implement `IntoResponse` from Axum, allowing them to be
 * returned directly from handlers.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "body": "Error message",
 *   "error": "invalid_request",
 *   "status": 400
 * }
 * ```
 */
use crate::backend::error::types::BackendError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON body of every error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    body: String,
    error: &'static str,
    status: u16,
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Gateway] Request failed: {}", self);
        } else {
            tracing::warn!("[Gateway] Request rejected: {}", self);
        }

        let body = ErrorBody {
            body: self.message(),
            error: self.kind(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
