//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timed out connecting to server")]
    ConnectTimeout,

    #[error("timed out waiting for response")]
    ResponseTimeout,

    #[error("connection closed before a response arrived")]
    ConnectionClosed,

    #[error("server error: {0}")]
    Server(String),
}
