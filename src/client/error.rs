use crate::shared::SharedError;
use std::time::Duration;
use thiserror::Error;

/// Why a client-side operation failed
///
/// Every failed `submit` has already rolled back its provisional entry by the
/// time one of these reaches the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The engine is not in a state that allows the operation
    #[error("engine not ready: {0}")]
    NotReady(&'static str),

    /// Blank text is never sent
    #[error("message text must not be empty")]
    EmptyText,

    /// No signed-in identity to author the message
    #[error("no signed-in identity")]
    NoIdentity,

    /// The server refused the request as invalid
    #[error("rejected by server: {0}")]
    Rejected(String),

    /// The server could not reach its store
    #[error("server store unavailable: {0}")]
    StoreUnavailable(String),

    /// The request never got a usable answer
    #[error("transport error: {0}")]
    Transport(String),

    /// The server did not answer in time
    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

impl SyncError {
    /// Failures where trying again later might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::Transport(_) | Self::Timeout(_)
        )
    }
}

impl From<SharedError> for SyncError {
    fn from(err: SharedError) -> Self {
        match err {
            SharedError::ValidationError { .. } => Self::Rejected(err.to_string()),
            SharedError::SerializationError { .. } => Self::Transport(err.to_string()),
        }
    }
}
