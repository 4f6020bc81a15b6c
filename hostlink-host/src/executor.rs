//! Single-consumer host loop and the bounded-rendezvous dispatcher.

use crate::command::{Command, CommandTable};
use hostlink_protocol::Response;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Default bound on the dispatch rendezvous.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Depth of the host job queue. Senders back-pressure once this many jobs
/// are waiting for the loop.
const JOB_QUEUE_DEPTH: usize = 64;

struct Job<S> {
    command: String,
    handler: Arc<dyn Command<S>>,
    params: Value,
    reply: oneshot::Sender<Response>,
}

/// The single execution context allowed to touch host state.
///
/// All handlers run here, one at a time, in arrival order — two
/// connections' handler bodies can never interleave. An embedding
/// application drives [`run`](Self::run) from whatever context owns its
/// state; the standalone binary just spawns it on the runtime.
pub struct HostExecutor<S> {
    state: S,
    jobs: mpsc::Receiver<Job<S>>,
}

impl<S> HostExecutor<S> {
    /// Creates an executor owning `state` and a dispatcher feeding it.
    pub fn new(state: S, table: CommandTable<S>) -> (Self, Dispatcher<S>) {
        let (tx, rx) = mpsc::channel(JOB_QUEUE_DEPTH);
        let executor = Self { state, jobs: rx };
        let dispatcher = Dispatcher {
            table: Arc::new(table),
            jobs: tx,
            timeout: DEFAULT_DISPATCH_TIMEOUT,
        };
        (executor, dispatcher)
    }

    /// Runs the host loop until every [`Dispatcher`] handle is dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.jobs.recv().await {
            tracing::debug!("host: executing '{}'", job.command);
            let response = job.handler.call(&mut self.state, job.params);
            // The requesting task may have given up (dispatch timeout or
            // disconnect); a dead reply channel is not an error here.
            let _ = job.reply.send(response);
        }
        tracing::debug!("host loop drained, stopping");
    }
}

/// Shared handle used by connection tasks to run commands on the host loop.
pub struct Dispatcher<S> {
    table: Arc<CommandTable<S>>,
    jobs: mpsc::Sender<Job<S>>,
    timeout: Duration,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            jobs: self.jobs.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S> Dispatcher<S> {
    /// Sets the rendezvous timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The command table this dispatcher resolves against.
    pub fn table(&self) -> &CommandTable<S> {
        &self.table
    }

    /// Resolves `command` and runs it on the host loop.
    ///
    /// Unknown names are rejected here without touching the queue. The
    /// rendezvous wait is bounded: expiry yields an error response instead
    /// of parking the connection task forever, and the handler — which
    /// cannot be cancelled once started — finishes on the loop with its
    /// reply discarded.
    pub async fn dispatch(&self, command: &str, params: Value) -> Response {
        let Some(handler) = self.table.get(command) else {
            return Response::unknown_command(command);
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job {
            command: command.to_string(),
            handler: Arc::clone(handler),
            params,
            reply: reply_tx,
        };

        if self.jobs.send(job).await.is_err() {
            return Response::error("Host loop is not running");
        }

        match tokio::time::timeout(self.timeout, reply_rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => Response::error("Host loop is not running"),
            Err(_) => {
                tracing::warn!(
                    "command '{}' exceeded the {}s dispatch timeout",
                    command,
                    self.timeout.as_secs()
                );
                Response::error(format!(
                    "Command '{}' timed out after {}s",
                    command,
                    self.timeout.as_secs()
                ))
            }
        }
    }
}
