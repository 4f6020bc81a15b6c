//! Interactive REPL.

use colored::Colorize;
use hostlink_client::Client;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use serde_json::{json, Value};
use std::net::SocketAddr;

const HELP_TEXT: &str = r#"
Usage:
  <command> [params-json]       Send a command to the server
                                e.g.  ping
                                      echo {"msg": "hi"}

  help                          Show this help
  commands                      List the commands the server exposes
  quit, exit                    Exit the REPL

Every line opens a fresh connection; the server answers once and closes.
"#;

pub async fn run(client: Client, addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "hostlink CLI".bold().cyan());
    println!("Server: {}", addr);

    // Create readline editor
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    // Load history
    let history_path = home::home_dir()
        .map(|h| h.join(".hostlink_history"))
        .unwrap_or_else(|| ".hostlink_history".into());
    let _ = rl.load_history(&history_path);

    println!("Type 'help' for usage.\n");

    loop {
        let prompt = format!("{} ", "hostlink>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match execute_repl_command(&client, line).await {
                    Ok(Some(output)) => println!("{}\n", output),
                    Ok(None) => break, // Exit command
                    Err(e) => println!("{}: {}\n", "Error".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    // Save history
    let _ = rl.save_history(&history_path);
    println!("{}", "Bye.".dimmed());

    Ok(())
}

async fn execute_repl_command(
    client: &Client,
    line: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "help" => return Ok(Some(HELP_TEXT.to_string())),
        "quit" | "exit" => return Ok(None),
        "commands" => {
            let response = client.send("list_commands", json!({})).await?;
            return Ok(Some(format_response(response)));
        }
        _ => {}
    }

    let params: Value = if rest.is_empty() {
        json!({})
    } else {
        serde_json::from_str(rest)?
    };

    let response = client.send(command, params).await?;
    Ok(Some(format_response(response)))
}

fn format_response(response: hostlink_protocol::Response) -> String {
    if response.success {
        match response.data {
            Some(data) => serde_json::to_string_pretty(&data)
                .unwrap_or_else(|_| "OK".green().to_string()),
            None => "OK".green().to_string(),
        }
    } else {
        format!(
            "{}: {}",
            "Error".red(),
            response.error.as_deref().unwrap_or("unknown error")
        )
    }
}
