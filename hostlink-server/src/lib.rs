//! # hostlink-server
//!
//! TCP front door for hostlink.
//!
//! This crate provides:
//! - TCP connection handling with async I/O
//! - One-request-per-connection lifecycle management
//! - Dispatch of parsed commands onto the single-threaded host loop
//! - Open-connection tracking for orderly shutdown
//! - Layered configuration (defaults, YAML file, environment)

pub mod config;
pub mod error;
pub mod server;
pub mod tracker;

pub use config::{Config, ConfigError, NetworkConfig};
pub use error::ServerError;
pub use server::{Server, ServerConfig, ServerStats};
pub use tracker::ConnectionTracker;
