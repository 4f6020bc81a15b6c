//! Protocol error types.

use crate::message::Response;
use thiserror::Error;

/// Errors from decoding an inbound request payload.
///
/// These are protocol errors, not transport errors: a connection that
/// produced one of these still gets a well-formed error [`Response`] back.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Payload is not valid UTF-8.
    #[error("request payload is not valid UTF-8")]
    InvalidUtf8,

    /// Payload is not parseable JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// JSON parsed but carries no string `command` field.
    #[error("missing 'command' field")]
    MissingCommand,
}

impl ParseError {
    /// The error response a server writes back for this parse failure.
    ///
    /// Undecodable payloads all collapse to the single `Invalid JSON`
    /// message; a structurally valid payload without a command name gets
    /// its own message so callers can tell the two apart.
    pub fn to_response(&self) -> Response {
        match self {
            ParseError::InvalidUtf8 | ParseError::InvalidJson(_) => Response::invalid_json(),
            ParseError::MissingCommand => Response::missing_command(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_responses() {
        assert_eq!(
            ParseError::InvalidUtf8.to_response().error.as_deref(),
            Some("Invalid JSON")
        );
        assert_eq!(
            ParseError::MissingCommand.to_response().error.as_deref(),
            Some("Missing 'command' field")
        );
    }
}
