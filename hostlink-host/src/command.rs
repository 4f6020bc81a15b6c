//! Command trait and the immutable command table.

use hostlink_protocol::Response;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// A named operation the host exposes to remote callers.
///
/// Handlers run on the host loop with exclusive access to the host state.
/// They report failure by returning an error [`Response`]; the dispatch
/// layer never interprets or wraps handler output.
pub trait Command<S>: Send + Sync {
    fn call(&self, state: &mut S, params: Value) -> Response;
}

impl<S, F> Command<S> for F
where
    F: Fn(&mut S, Value) -> Response + Send + Sync,
{
    fn call(&self, state: &mut S, params: Value) -> Response {
        self(state, params)
    }
}

/// Errors detected while building a [`CommandTable`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("command '{0}' is already registered")]
    Duplicate(String),

    #[error("alias '{alias}' targets unregistered command '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}

/// Read-only mapping from command name to handler.
///
/// Built once, injected into the server, never mutated afterward; there is
/// no dynamic registration. An alias is a second name resolving to the same
/// handler, registered explicitly — lookup does no fuzzy matching.
pub struct CommandTable<S> {
    entries: HashMap<String, Arc<dyn Command<S>>>,
}

impl<S> CommandTable<S> {
    pub fn builder() -> CommandTableBuilder<S> {
        CommandTableBuilder {
            commands: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command<S>>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names (including aliases), sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> std::fmt::Debug for CommandTable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("commands", &self.names())
            .finish()
    }
}

/// Builder for [`CommandTable`].
///
/// Registrations are collected and validated in [`build`](Self::build);
/// aliases may be declared before their target.
pub struct CommandTableBuilder<S> {
    commands: Vec<(String, Arc<dyn Command<S>>)>,
    aliases: Vec<(String, String)>,
}

impl<S> CommandTableBuilder<S> {
    /// Registers `handler` under `name`.
    pub fn command(mut self, name: impl Into<String>, handler: impl Command<S> + 'static) -> Self {
        self.commands.push((name.into(), Arc::new(handler)));
        self
    }

    /// Maps `alias` to the handler registered under `target`.
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }

    pub fn build(self) -> Result<CommandTable<S>, TableError> {
        let mut entries: HashMap<String, Arc<dyn Command<S>>> =
            HashMap::with_capacity(self.commands.len() + self.aliases.len());

        for (name, handler) in self.commands {
            if entries.insert(name.clone(), handler).is_some() {
                return Err(TableError::Duplicate(name));
            }
        }

        for (alias, target) in self.aliases {
            let handler = entries
                .get(&target)
                .cloned()
                .ok_or_else(|| TableError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                })?;
            if entries.insert(alias.clone(), handler).is_some() {
                return Err(TableError::Duplicate(alias));
            }
        }

        Ok(CommandTable { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pong(_state: &mut u32, _params: Value) -> Response {
        Response::ok(json!({"message": "pong"}))
    }

    #[test]
    fn test_table_lookup() {
        let table = CommandTable::builder().command("ping", pong).build().unwrap();
        assert!(table.contains("ping"));
        assert!(!table.contains("pong"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_alias_resolves_to_same_handler() {
        let table = CommandTable::<u32>::builder()
            .command("clear_graph", |state: &mut u32, _params: Value| {
                *state += 1;
                Response::ok_empty()
            })
            .alias("empty_graph", "clear_graph")
            .build()
            .unwrap();

        let mut state = 0;
        for name in ["clear_graph", "empty_graph"] {
            let handler = table.get(name).unwrap();
            assert!(handler.call(&mut state, json!({})).success);
        }
        assert_eq!(state, 2);
        assert_eq!(table.names(), vec!["clear_graph", "empty_graph"]);
    }

    #[test]
    fn test_alias_declared_before_target() {
        let table = CommandTable::<u32>::builder()
            .alias("empty_graph", "clear_graph")
            .command("clear_graph", |_: &mut u32, _: Value| Response::ok_empty())
            .build()
            .unwrap();
        assert!(table.contains("empty_graph"));
    }

    #[test]
    fn test_duplicate_command_rejected() {
        let err = CommandTable::<u32>::builder()
            .command("ping", pong)
            .command("ping", pong)
            .build()
            .unwrap_err();
        assert_eq!(err, TableError::Duplicate("ping".to_string()));
    }

    #[test]
    fn test_alias_of_unknown_target_rejected() {
        let err = CommandTable::<u32>::builder()
            .alias("empty_graph", "clear_graph")
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::UnknownAliasTarget { .. }));
    }

    #[test]
    fn test_alias_colliding_with_command_rejected() {
        let err = CommandTable::<u32>::builder()
            .command("ping", pong)
            .command("status", pong)
            .alias("ping", "status")
            .build()
            .unwrap_err();
        assert_eq!(err, TableError::Duplicate("ping".to_string()));
    }
}
