use crate::backend::chat::query::QueryService;
use crate::backend::error::BackendError;
use crate::shared::GetMessagesResponse;
use axum::{extract::State, http::Method, Json};

/// Handle feed snapshot (GET /getMessages)
///
/// Returns every stored message, newest first.
///
/// # Errors
///
/// * `405 Method Not Allowed` - For any method other than GET
/// * `503 Service Unavailable` - If the store could not be read
pub async fn handle_get_messages(
    State(query): State<QueryService>,
    method: Method,
) -> Result<Json<GetMessagesResponse>, BackendError> {
    if method != Method::GET {
        return Err(BackendError::method_not_allowed(format!(
            "You are trying to make a {} request to a GET request endpoint. Method Not Allowed!",
            method
        )));
    }

    let messages = query.snapshot().await?;
    Ok(Json(GetMessagesResponse { messages }))
}
