//! Parsing and encoding of wire payloads.

use crate::error::ParseError;
use crate::message::{Request, Response};
use bytes::BytesMut;
use serde_json::Value;

/// Decodes one inbound payload as a [`Request`].
///
/// The payload is whatever a single read produced; there is no framing.
/// Surrounding whitespace (including a trailing newline some clients send)
/// is ignored.
pub fn parse_request(payload: &[u8]) -> Result<Request, ParseError> {
    let text = std::str::from_utf8(payload).map_err(|_| ParseError::InvalidUtf8)?;
    let value: Value = serde_json::from_str(text.trim()).map_err(ParseError::InvalidJson)?;

    let command = value
        .get("command")
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingCommand)?
        .to_string();

    let params = value
        .get("params")
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));

    Ok(Request { command, params })
}

/// Encodes a [`Response`] as newline-terminated JSON.
pub fn encode_response(response: &Response) -> Result<BytesMut, serde_json::Error> {
    let mut bytes = serde_json::to_vec(response)?;
    bytes.push(b'\n');
    Ok(BytesMut::from(&bytes[..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_parse_request_basic() {
        let req = parse_request(br#"{"command":"ping","params":{"x":1}}"#).unwrap();
        assert_eq!(req.command, "ping");
        assert_eq!(req.params, json!({"x": 1}));
    }

    #[test]
    fn test_parse_request_without_params() {
        let req = parse_request(br#"{"command":"ping"}"#).unwrap();
        assert_eq!(req.params, json!({}));
    }

    #[test]
    fn test_parse_request_trailing_newline() {
        let req = parse_request(b"{\"command\":\"ping\"}\n").unwrap();
        assert_eq!(req.command, "ping");
    }

    #[test]
    fn test_parse_request_invalid_json() {
        assert!(matches!(
            parse_request(br#"{"command": "#),
            Err(ParseError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_request(b"not json at all"),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_request_invalid_utf8() {
        assert!(matches!(
            parse_request(&[0xff, 0xfe, 0xfd]),
            Err(ParseError::InvalidUtf8)
        ));
    }

    #[test]
    fn test_parse_request_missing_command() {
        assert!(matches!(
            parse_request(br#"{"params":{}}"#),
            Err(ParseError::MissingCommand)
        ));
        // A non-string command is as good as no command.
        assert!(matches!(
            parse_request(br#"{"command":42}"#),
            Err(ParseError::MissingCommand)
        ));
    }

    #[test]
    fn test_encode_response_newline_terminated() {
        let bytes = encode_response(&Response::ok_empty()).unwrap();
        assert_eq!(&bytes[..], b"{\"success\":true}\n");
    }

    #[test]
    fn test_response_roundtrip_ok() {
        let data = json!({"name": "walker", "count": 3});
        let encoded = encode_response(&Response::ok(data.clone())).unwrap();
        let parsed: Response = serde_json::from_slice(encoded.strip_suffix(b"\n").unwrap()).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.data, Some(data));
        assert_eq!(parsed.error, None);
    }

    #[test]
    fn test_response_roundtrip_error() {
        let encoded = encode_response(&Response::error("msg")).unwrap();
        let text = String::from_utf8(encoded.to_vec()).unwrap();
        assert!(!text.contains("data"));
        let parsed: Response = serde_json::from_str(text.trim()).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("msg"));
        assert_eq!(parsed.data, None);
    }

    proptest! {
        #[test]
        fn prop_request_roundtrip(command in "[a-z_]{1,24}", key in "[a-z]{1,8}", val in any::<i64>()) {
            let mut params = serde_json::Map::new();
            params.insert(key, json!(val));
            let original = Request::new(command).with_params(Value::Object(params));
            let bytes = serde_json::to_vec(&original).unwrap();
            let parsed = parse_request(&bytes).unwrap();
            prop_assert_eq!(parsed, original);
        }

        #[test]
        fn prop_error_response_roundtrip(msg in "\\PC{0,64}") {
            let encoded = encode_response(&Response::error(msg.clone())).unwrap();
            let parsed: Response = serde_json::from_slice(&encoded).unwrap();
            prop_assert!(!parsed.success);
            prop_assert_eq!(parsed.error, Some(msg));
            prop_assert_eq!(parsed.data, None);
        }
    }
}
