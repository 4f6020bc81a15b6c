//! # hostlink-host
//!
//! The host side of hostlink: a table of named commands and the single
//! execution context allowed to run them.
//!
//! Connections are served concurrently, but host state (a live editor
//! session, a simulation world) is not thread-safe. Every handler therefore
//! runs on one logical host loop: connection tasks resolve the command,
//! enqueue a job, and wait — with a bounded timeout — for the loop to hand
//! back a response.

pub mod command;
pub mod executor;

pub use command::{Command, CommandTable, CommandTableBuilder, TableError};
pub use executor::{Dispatcher, HostExecutor, DEFAULT_DISPATCH_TIMEOUT};
