//! TCP server implementation.

use crate::error::ServerError;
use crate::tracker::ConnectionTracker;
use hostlink_host::Dispatcher;
use hostlink_protocol::{encode_response, parse_request, DEFAULT_PORT, MAX_REQUEST_BYTES};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// How long shutdown waits for connection tasks to deregister.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// How long a connection may sit without sending its request.
    pub request_timeout: Duration,
    /// Bound on the host-loop rendezvous.
    pub dispatch_timeout: Duration,
    /// Receive budget for a single request.
    pub max_request_bytes: usize,
    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            request_timeout: Duration::from_secs(5),
            dispatch_timeout: Duration::from_secs(30),
            max_request_bytes: MAX_REQUEST_BYTES,
            max_connections: 64,
        }
    }
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }
}

impl From<&crate::config::Config> for ServerConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            bind_addr: config.network.bind_addr,
            request_timeout: config.network.request_timeout(),
            dispatch_timeout: config.network.dispatch_timeout(),
            max_request_bytes: config.network.max_request_bytes,
            max_connections: config.network.max_connections,
        }
    }
}

/// Server statistics.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_total: AtomicU64,
    pub connections_active: AtomicU64,
    pub requests_total: AtomicU64,
    pub errors_total: AtomicU64,
}

/// TCP front door for a hostlink host.
///
/// One request per connection: accept, wait for a single JSON command,
/// dispatch it onto the host loop, write one newline-terminated response,
/// close. Connection tasks run concurrently; handler bodies do not.
pub struct Server<S> {
    config: ServerConfig,
    dispatcher: Dispatcher<S>,
    connections: ConnectionTracker,
    stats: Arc<ServerStats>,
    shutdown: broadcast::Sender<()>,
    running: AtomicBool,
    listener: Mutex<Option<TcpListener>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl<S: 'static> Server<S> {
    /// Creates a new server around an injected dispatcher.
    pub fn new(config: ServerConfig, dispatcher: Dispatcher<S>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            dispatcher,
            connections: ConnectionTracker::new(),
            stats: Arc::new(ServerStats::default()),
            shutdown: shutdown_tx,
            running: AtomicBool::new(false),
            listener: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    /// Binds the listening socket.
    ///
    /// A failed bind (port in use, permission denied) allocates nothing;
    /// binding twice without an intervening shutdown is an error.
    pub async fn bind(&self) -> Result<SocketAddr, ServerError> {
        if self.running.load(Ordering::SeqCst) || self.listener.lock().is_some() {
            return Err(ServerError::AlreadyBound);
        }

        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let addr = listener.local_addr()?;

        let mut slot = self.listener.lock();
        if slot.is_some() {
            return Err(ServerError::AlreadyBound);
        }
        *slot = Some(listener);
        *self.local_addr.lock() = Some(addr);

        Ok(addr)
    }

    /// Runs the accept loop until shutdown, binding first if needed.
    pub async fn run(&self) -> Result<(), ServerError> {
        // Take the guard in its own statement; holding it across bind()
        // would deadlock.
        let taken = self.listener.lock().take();
        let listener = match taken {
            Some(listener) => listener,
            None => {
                self.bind().await?;
                let rebound = self.listener.lock().take();
                rebound.ok_or(ServerError::AlreadyBound)?
            }
        };

        self.running.store(true, Ordering::SeqCst);
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.accept_connection(stream, addr),
                        Err(e) => {
                            tracing::error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Server shutting down");
                    break;
                }
            }
        }

        // The listener drops here; give connection tasks a bounded window
        // to observe the shutdown signal and deregister.
        let drained = tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, async {
            while !self.connections.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        self.running.store(false, Ordering::SeqCst);
        self.local_addr.lock().take();

        match drained {
            Ok(()) => Ok(()),
            Err(_) => Err(ServerError::DrainTimeout(SHUTDOWN_DRAIN_TIMEOUT)),
        }
    }

    fn accept_connection(&self, stream: TcpStream, addr: SocketAddr) {
        if self.stats.connections_active.load(Ordering::Relaxed)
            >= self.config.max_connections as u64
        {
            tracing::warn!("Connection limit reached, rejecting {}", addr);
            return;
        }

        self.stats.connections_total.fetch_add(1, Ordering::Relaxed);
        self.stats.connections_active.fetch_add(1, Ordering::Relaxed);

        let dispatcher = self.dispatcher.clone();
        let stats = self.stats.clone();
        let config = self.config.clone();
        let tracker = self.connections.clone();
        let mut conn_shutdown = self.shutdown.subscribe();
        let id = tracker.register();

        tokio::spawn(async move {
            let result = Self::handle_connection(
                stream,
                addr,
                dispatcher,
                &config,
                &stats,
                &mut conn_shutdown,
            )
            .await;

            if let Err(e) = result {
                tracing::debug!("Connection {} error: {}", addr, e);
                stats.errors_total.fetch_add(1, Ordering::Relaxed);
            }

            stats.connections_active.fetch_sub(1, Ordering::Relaxed);
            tracker.deregister(id);
            tracing::info!("Client disconnected: {}", addr);
        });
    }

    /// Handles a single connection: one request, one response, close.
    ///
    /// Transport failures (no data within the wait budget, disconnect,
    /// read/write errors) abandon the connection without a response; the
    /// caller must reconnect and resend. Protocol failures get a
    /// well-formed error response.
    async fn handle_connection(
        mut stream: TcpStream,
        addr: SocketAddr,
        dispatcher: Dispatcher<S>,
        config: &ServerConfig,
        stats: &ServerStats,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        tracing::info!("Client connected: {}", addr);

        // Low latency; close must not block or reset in-flight data.
        stream.set_nodelay(true)?;
        stream.set_linger(None)?;

        let mut buf = vec![0u8; config.max_request_bytes];

        let n = tokio::select! {
            biased;

            _ = shutdown.recv() => {
                return Err(ServerError::ShuttingDown);
            }

            read = tokio::time::timeout(config.request_timeout, stream.read(&mut buf)) => {
                match read {
                    Ok(Ok(0)) => {
                        tracing::debug!("[{}] Connection closed before sending data", addr);
                        return Ok(());
                    }
                    Ok(Ok(n)) => n,
                    Ok(Err(e)) => {
                        tracing::debug!("[{}] Read error: {}", addr, e);
                        return Err(ServerError::Io(e));
                    }
                    Err(_) => {
                        tracing::debug!("[{}] Timed out waiting for request", addr);
                        return Ok(());
                    }
                }
            }
        };

        tracing::debug!("[{}] Received {} bytes", addr, n);
        stats.requests_total.fetch_add(1, Ordering::Relaxed);

        let response = match parse_request(&buf[..n]) {
            Ok(request) => {
                tracing::info!("[{}] Request: {}", addr, request.command);
                tokio::select! {
                    biased;

                    _ = shutdown.recv() => {
                        return Err(ServerError::ShuttingDown);
                    }

                    response = dispatcher.dispatch(&request.command, request.params) => response,
                }
            }
            Err(e) => {
                tracing::debug!("[{}] Bad request: {}", addr, e);
                e.to_response()
            }
        };

        tracing::info!(
            "[{}] Response: {}",
            addr,
            if response.success { "OK" } else { "ERROR" }
        );

        // write_all retries partial sends and aborts on zero progress.
        let response_bytes = encode_response(&response)?;
        tracing::debug!("[{}] Writing {} bytes", addr, response_bytes.len());
        stream.write_all(&response_bytes).await?;

        // One request per connection; the socket closes on drop.
        Ok(())
    }

    /// Initiates server shutdown: stop accepting, close every tracked
    /// connection. Safe to call when never started.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Returns whether the accept loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns the bound address, if bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Number of currently open connections.
    pub fn active_connections(&self) -> usize {
        self.connections.active()
    }

    /// Returns server statistics.
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }
}
