//! # hostlink-protocol
//!
//! Wire protocol for hostlink: one-shot JSON commands over TCP.
//!
//! This crate provides:
//! - Request/Response message types
//! - Lenient request parsing with distinct protocol error classes
//! - Newline-terminated response encoding
//! - Protocol constants

pub mod codec;
pub mod error;
pub mod message;

pub use codec::{encode_response, parse_request};
pub use error::ParseError;
pub use message::{Request, Response};

/// Default port for hostlink servers.
pub const DEFAULT_PORT: u16 = 9877;

/// Receive budget for a single request.
///
/// There is no framing on the wire: a request must arrive within one read of
/// at most this many bytes. Payloads spanning more than one receive buffer
/// are not reassembled.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;
