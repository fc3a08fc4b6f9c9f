/**
 * Backend Error Types
 *
 * This module defines the HTTP-facing error type of the server. Handlers
 * return `Result<_, BackendError>`; lower layers (`GatewayError`,
 * `StoreError`, `FanoutError`, `SharedError`) convert into it with `?`.
 *
 * # Error Categories
 *
 * - **Method not allowed** - the route exists but not for this verb (405)
 * - **Invalid request** - user-correctable input problems, never retried (400)
 * - **Store unavailable** - the message store failed; nothing was applied (503)
 * - **Serialization** - a response could not be encoded (500)
 */
use crate::backend::chat::gateway::GatewayError;
use crate::backend::realtime::FanoutError;
use crate::backend::store::StoreError;
use crate::shared::SharedError;
use axum::http::StatusCode;
use thiserror::Error;

/// Backend-specific error types
///
/// Each variant maps to one HTTP status and one stable `kind` string that
/// clients can match on.
///
/// # Usage
///
/// ```rust
/// use feedsync::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::invalid_request("text must not be empty");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.kind(), "invalid_request");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// The route does not accept this HTTP method
    #[error("Method not allowed: {message}")]
    MethodNotAllowed {
        /// Human-readable error message
        message: String,
    },

    /// The request was malformed or failed validation
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Human-readable error message
        message: String,
    },

    /// The message store could not complete the operation
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a 405 error
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            message: message.into(),
        }
    }

    /// Create a 400 error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `MethodNotAllowed` - 405 Method Not Allowed
    /// - `InvalidRequest` - 400 Bad Request
    /// - `StoreUnavailable` - 503 Service Unavailable
    /// - `SharedError` - 400 for validation, 500 for serialization
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::SharedError(SharedError::ValidationError { .. }) => "invalid_request",
            Self::SharedError(SharedError::SerializationError { .. }) => "serialization",
            Self::SerializationError(_) => "serialization",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::MethodNotAllowed { message } => message.clone(),
            Self::InvalidRequest { message } => message.clone(),
            Self::StoreUnavailable(err) => err.to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}

impl From<GatewayError> for BackendError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidRequest(err) => Self::SharedError(err),
            GatewayError::StoreUnavailable(err) => Self::StoreUnavailable(err),
        }
    }
}

impl From<FanoutError> for BackendError {
    fn from(err: FanoutError) -> Self {
        Self::invalid_request(err.to_string())
    }
}
