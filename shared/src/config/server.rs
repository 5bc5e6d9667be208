//! Server configuration module

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::errors::ConfigError;

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Reverse proxies whose `X-Forwarded-For` / `X-Real-IP` are believed.
    /// Empty means the peer address is always the client.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8080,
            workers: 0, // Use all CPU cores
            trusted_proxies: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: super::parse_env("SERVER_PORT", defaults.port)?,
            workers: super::parse_env("SERVER_WORKERS", defaults.workers)?,
            trusted_proxies: trusted_proxies_from_env()?,
        })
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Comma-separated `TRUSTED_PROXIES`, e.g. `10.0.0.1, 10.0.0.2`
fn trusted_proxies_from_env() -> Result<Vec<IpAddr>, ConfigError> {
    let raw = match std::env::var("TRUSTED_PROXIES") {
        Ok(raw) => raw,
        Err(_) => return Ok(Vec::new()),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse().map_err(|_| {
                ConfigError::invalid("TRUSTED_PROXIES", format!("'{}' is not an IP address", entry))
            })
        })
        .collect()
}
