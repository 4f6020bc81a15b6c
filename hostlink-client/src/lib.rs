//! # hostlink-client
//!
//! Client library for hostlink.
//!
//! The wire contract is one command per connection, so the client is
//! connectionless from the caller's point of view: every
//! [`send`](Client::send) opens a fresh TCP connection, writes one JSON
//! request, reads the newline-terminated response, and disconnects.

pub mod client;
pub mod error;

pub use client::{Client, ClientConfig};
pub use error::ClientError;
