//! hostlink-cli - Command-line interface for hostlink servers
//!
//! Provides both a REPL and one-shot command execution.

mod commands;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use hostlink_client::Client;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hostlink-cli")]
#[command(about = "Command-line interface for hostlink servers")]
#[command(version)]
struct Cli {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:9877", env = "HOSTLINK_SERVER")]
    server: SocketAddr,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start interactive REPL
    Repl,

    /// Ping the server
    Ping,

    /// List the commands the server exposes
    Commands,

    /// Send an arbitrary command
    Send {
        /// Command name
        name: String,

        /// Params JSON (or @file.json to read from file)
        params: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let client = Client::new(cli.server);

    match cli.command {
        Some(Commands::Repl) | None => {
            repl::run(client, cli.server).await?;
        }
        Some(cmd) => match commands::execute(&client, cmd).await {
            Ok(output) => {
                println!("{}", output);
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
