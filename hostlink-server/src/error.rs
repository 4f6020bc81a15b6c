//! Server error types.

use std::time::Duration;
use thiserror::Error;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("server is already bound")]
    AlreadyBound,

    #[error("server shutting down")]
    ShuttingDown,

    #[error("open connections failed to drain within {0:?}")]
    DrainTimeout(Duration),
}
