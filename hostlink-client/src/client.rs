//! One-shot client for the hostlink wire protocol.

use crate::error::ClientError;
use hostlink_protocol::{Request, Response, DEFAULT_PORT};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Read chunk size while accumulating a response.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address.
    pub addr: SocketAddr,
    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Timeout for the complete response to arrive.
    pub response_timeout: Duration,
}

impl ClientConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
    }
}

/// Client for a hostlink server.
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            config: ClientConfig::new(addr),
        }
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Sends one command and returns the server's response.
    pub async fn send(&self, command: &str, params: Value) -> Result<Response, ClientError> {
        let request = Request::new(command).with_params(params);
        let payload = serde_json::to_vec(&request)?;
        self.send_raw(&payload).await
    }

    /// Sends a raw payload and parses whatever comes back as a [`Response`].
    ///
    /// Useful for exercising a server's protocol-error paths with payloads
    /// [`send`](Self::send) could never produce.
    pub async fn send_raw(&self, payload: &[u8]) -> Result<Response, ClientError> {
        let mut stream =
            tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(self.config.addr))
                .await
                .map_err(|_| ClientError::ConnectTimeout)??;
        stream.set_nodelay(true)?;

        tracing::debug!("sending {} bytes to {}", payload.len(), self.config.addr);
        stream.write_all(payload).await?;

        // The server replies once, newline-terminated, then closes.
        let data = tokio::time::timeout(self.config.response_timeout, async {
            let mut data = Vec::new();
            let mut buf = [0u8; READ_CHUNK_SIZE];
            loop {
                let n = stream.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                data.extend_from_slice(&buf[..n]);
                if data.ends_with(b"\n") {
                    break;
                }
            }
            Ok::<_, std::io::Error>(data)
        })
        .await
        .map_err(|_| ClientError::ResponseTimeout)??;

        if data.is_empty() {
            return Err(ClientError::ConnectionClosed);
        }

        tracing::debug!("received {} bytes from {}", data.len(), self.config.addr);
        Ok(serde_json::from_slice(&data)?)
    }

    /// Pings the server, failing on any error response.
    pub async fn ping(&self) -> Result<(), ClientError> {
        let response = self.send("ping", Value::Object(Default::default())).await?;
        if response.success {
            Ok(())
        } else {
            Err(ClientError::Server(
                response.error.unwrap_or_else(|| "ping failed".to_string()),
            ))
        }
    }
}
