//! hostlink - one-shot JSON command bridge for single-threaded hosts.
//!
//! Standalone server binary serving the built-in diagnostic command set.
//! An embedding application would instead build its own command table over
//! its own state and pump the host loop from the thread that owns it.

use hostlink_host::{CommandTable, HostExecutor, TableError};
use hostlink_protocol::Response;
use hostlink_server::{Config, Server, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration (from file if HOSTLINK_CONFIG is set, then env overrides)
    let config = match Config::load() {
        Ok(c) => {
            if let Ok(path) = std::env::var("HOSTLINK_CONFIG") {
                tracing::info!("Loaded config from {}", path);
            }
            c
        }
        Err(e) => {
            // If a config file was explicitly specified, fail on error
            if std::env::var("HOSTLINK_CONFIG").is_ok() {
                tracing::error!("Failed to load config: {}", e);
                return Err(e.into());
            }
            tracing::info!("Using default configuration");
            Config::default()
        }
    };

    tracing::info!("Starting hostlink server");
    tracing::info!("  Bind address: {}", config.network.bind_addr);
    tracing::info!("  Request timeout: {}s", config.network.request_timeout_secs);
    tracing::info!("  Dispatch timeout: {}s", config.network.dispatch_timeout_secs);

    // Built-in diagnostic commands; the unit state stands in for an
    // embedding application's world.
    let table = builtin_table()?;
    tracing::info!("  Commands: {}", table.names().join(", "));

    let (executor, dispatcher) = HostExecutor::new((), table);
    let dispatcher = dispatcher.with_timeout(config.network.dispatch_timeout());
    let host = tokio::spawn(executor.run());

    let server = Arc::new(Server::new(ServerConfig::from(&config), dispatcher));

    // Spawn shutdown signal handler
    let shutdown_server = server.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping server...");
        shutdown_server.shutdown();
    });

    // Run server (blocks until shutdown)
    server.run().await?;

    host.abort();
    tracing::info!("Server stopped");
    Ok(())
}

fn builtin_table() -> Result<CommandTable<()>, TableError> {
    let mut names = vec!["ping", "echo", "list_commands"];
    names.sort_unstable();
    let names: Vec<String> = names.into_iter().map(str::to_string).collect();

    CommandTable::builder()
        .command("ping", |_state: &mut (), _params: Value| {
            Response::ok(json!({"message": "pong"}))
        })
        .command("echo", |_state: &mut (), params: Value| Response::ok(params))
        .command("list_commands", move |_state: &mut (), _params: Value| {
            Response::ok(json!({"commands": names.clone(), "count": names.len()}))
        })
        .build()
}
