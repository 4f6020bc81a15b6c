//! One-shot command execution.

use crate::Commands;
use colored::Colorize;
use hostlink_client::Client;
use hostlink_protocol::Response;
use serde_json::{json, Value};
use std::time::Instant;

pub async fn execute(client: &Client, cmd: Commands) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Ping => {
            let start = Instant::now();
            client.ping().await?;
            let elapsed = start.elapsed();
            Ok(format!("{} ({} ms)", "pong".green(), elapsed.as_millis()))
        }
        Commands::Commands => {
            let response = client.send("list_commands", json!({})).await?;
            let data = expect_success(response)?;
            let names: Vec<String> = data
                .get("commands")
                .and_then(Value::as_array)
                .map(|a| {
                    a.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Ok(names.join("\n"))
        }
        Commands::Send { name, params } => {
            let params = parse_params(params)?;
            let response = client.send(&name, params).await?;
            let data = expect_success(response)?;
            if data.is_null() {
                Ok("OK".green().to_string())
            } else {
                Ok(serde_json::to_string_pretty(&data)?)
            }
        }
        Commands::Repl => unreachable!("repl is handled in main"),
    }
}

/// Parses the params argument: absent means `{}`, `@path` reads a JSON
/// file, anything else is inline JSON.
pub fn parse_params(arg: Option<String>) -> Result<Value, Box<dyn std::error::Error>> {
    let Some(arg) = arg else {
        return Ok(json!({}));
    };
    let text = if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path)?
    } else {
        arg
    };
    Ok(serde_json::from_str(&text)?)
}

fn expect_success(response: Response) -> Result<Value, Box<dyn std::error::Error>> {
    if response.success {
        Ok(response.data.unwrap_or(Value::Null))
    } else {
        Err(response
            .error
            .unwrap_or_else(|| "unknown error".to_string())
            .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params_default() {
        assert_eq!(parse_params(None).unwrap(), json!({}));
    }

    #[test]
    fn test_parse_params_inline() {
        let params = parse_params(Some(r#"{"x": 1}"#.to_string())).unwrap();
        assert_eq!(params, json!({"x": 1}));
    }

    #[test]
    fn test_parse_params_rejects_bad_json() {
        assert!(parse_params(Some("{".to_string())).is_err());
    }

    #[test]
    fn test_expect_success_unwraps_data() {
        let data = expect_success(Response::ok(json!({"a": true}))).unwrap();
        assert_eq!(data, json!({"a": true}));
    }

    #[test]
    fn test_expect_success_surfaces_error() {
        let err = expect_success(Response::error("nope")).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
