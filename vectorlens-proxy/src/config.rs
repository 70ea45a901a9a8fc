use std::net::SocketAddr;

use vectorlens_core::LensConfig;

use crate::error::{ProxyError, Result};

/// Collection that `/store` writes to when none is configured.
pub const DEFAULT_COLLECTION: &str = "vectorlens-memory";

/// Settings for the proxy binary.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Where the vector store lives.
    pub upstream: LensConfig,
    /// Target of `/store`, and of other endpoints when a request names no collection.
    pub default_collection: String,
    /// Program and arguments run by `/sync`.
    pub sync_command: Option<Vec<String>>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3201,
            upstream: LensConfig::default(),
            default_collection: DEFAULT_COLLECTION.to_string(),
            sync_command: None,
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `VECTORLENS_PROXY_*` settings plus the upstream `VECTORLENS_*` ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let upstream = LensConfig::from_lookup(&lookup)?;

        let host = lookup("VECTORLENS_PROXY_HOST").unwrap_or(defaults.host);
        let port = match lookup("VECTORLENS_PROXY_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ProxyError::Config(format!("VECTORLENS_PROXY_PORT must be a port number, got '{raw}'"))
            })?,
            None => defaults.port,
        };
        let default_collection = lookup("VECTORLENS_DEFAULT_COLLECTION")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.default_collection);
        let sync_command = lookup("VECTORLENS_SYNC_COMMAND")
            .map(|raw| raw.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|argv| !argv.is_empty());

        Ok(Self { host, port, upstream, default_collection, sync_command })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ProxyError::Config(format!("invalid host/port for proxy server: {e}")))
    }
}
