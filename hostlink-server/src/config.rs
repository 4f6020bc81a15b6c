//! Server configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via HOSTLINK_CONFIG)
//! 3. Environment variables

use hostlink_protocol::{DEFAULT_PORT, MAX_REQUEST_BYTES};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network configuration.
    pub network: NetworkConfig,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("HOSTLINK_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        self.network.apply_env_overrides();
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address to bind to. All interfaces by default: the bridge is meant
    /// to be reachable by local tooling without further setup.
    #[serde(with = "socket_addr_serde")]
    pub bind_addr: SocketAddr,
    /// How long a connection may sit without sending its request, in seconds.
    pub request_timeout_secs: u64,
    /// Bound on the host-loop rendezvous, in seconds.
    pub dispatch_timeout_secs: u64,
    /// Receive budget for a single request.
    pub max_request_bytes: usize,
    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            request_timeout_secs: 5,
            dispatch_timeout_secs: 30,
            max_request_bytes: MAX_REQUEST_BYTES,
            max_connections: 64,
        }
    }
}

impl NetworkConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("HOSTLINK_BIND") {
            if let Ok(parsed) = addr.parse() {
                self.bind_addr = parsed;
            }
        }

        if let Ok(timeout) = std::env::var("HOSTLINK_REQUEST_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.request_timeout_secs = secs;
            }
        }

        if let Ok(timeout) = std::env::var("HOSTLINK_DISPATCH_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.dispatch_timeout_secs = secs;
            }
        }

        if let Ok(bytes) = std::env::var("HOSTLINK_MAX_REQUEST_BYTES") {
            if let Ok(n) = bytes.parse() {
                self.max_request_bytes = n;
            }
        }

        if let Ok(max) = std::env::var("HOSTLINK_MAX_CONNECTIONS") {
            if let Ok(n) = max.parse() {
                self.max_connections = n;
            }
        }
    }

    /// Returns the request wait budget as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the dispatch rendezvous bound as a Duration.
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Custom serde module for SocketAddr (to handle as string in YAML).
mod socket_addr_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::net::SocketAddr;

    pub fn serialize<S>(addr: &SocketAddr, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&addr.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.bind_addr.port(), 9877);
        assert_eq!(config.network.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.network.dispatch_timeout(), Duration::from_secs(30));
        assert_eq!(config.network.max_request_bytes, 64 * 1024);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.network.bind_addr, config.network.bind_addr);
        assert_eq!(parsed.network.max_connections, config.network.max_connections);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostlink.yaml");
        std::fs::write(
            &path,
            "network:\n  bind_addr: \"127.0.0.1:4000\"\n  request_timeout_secs: 2\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.network.bind_addr.port(), 4000);
        assert_eq!(config.network.request_timeout_secs, 2);
        // Unspecified fields keep their defaults.
        assert_eq!(config.network.max_connections, 64);
    }

    #[test]
    fn test_from_file_missing() {
        assert!(Config::from_file("/nonexistent/hostlink.yaml").is_err());
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        let mut config = Config::default();
        config.network.max_connections = 7;
        config.save(&path).unwrap();

        let parsed = Config::from_file(&path).unwrap();
        assert_eq!(parsed.network.max_connections, 7);
    }
}
