/**
 * Add Message Handler
 *
 * `POST /addMessage` is the HTTP face of `PublishGateway::accept`.
 *
 * The route is registered for every method so that a wrong verb gets the
 * feed's own 405 body instead of an empty router response, and so the check
 * happens before the body is even parsed.
 */
use crate::backend::chat::gateway::PublishGateway;
use crate::backend::error::BackendError;
use crate::shared::{AddMessageRequest, AddMessageResponse};
use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    Json,
};
use std::sync::Arc;

/// Handle message submission (POST /addMessage)
///
/// The author carried in the body is the caller identity handed over by the
/// authentication layer in front of this server. Any `createdAt` in the body
/// is discarded.
///
/// # Errors
///
/// * `405 Method Not Allowed` - For any method other than POST; nothing is written
/// * `400 Bad Request` - If the body is not JSON or fails validation
/// * `503 Service Unavailable` - If the store rejected the write
///
/// # Example Request
///
/// ```http
/// POST /addMessage HTTP/1.1
/// Content-Type: application/json
///
/// {"message":{"id":"4b1c...","text":"hi","createdAt":1000,
///   "author":{"displayName":"Alice","avatarUrl":"...","identityKey":"alice@example.com"}}}
/// ```
pub async fn handle_add_message(
    State(gateway): State<Arc<PublishGateway>>,
    method: Method,
    body: Bytes,
) -> Result<Json<AddMessageResponse>, BackendError> {
    if method != Method::POST {
        return Err(BackendError::method_not_allowed(format!(
            "You are trying to make a {} request to a POST request endpoint. Method Not Allowed!",
            method
        )));
    }

    let request: AddMessageRequest = serde_json::from_slice(&body)
        .map_err(|e| BackendError::invalid_request(format!("malformed request body: {}", e)))?;

    let identity = request.message.author.clone();
    let message = gateway.accept(request.message, identity).await?;

    Ok(Json(AddMessageResponse { message }))
}
