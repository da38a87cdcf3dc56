//! HTTP server settings: bind address and route prefix.

use crate::errors::{Error, Result};
use std::net::SocketAddr;

/// Listen on every interface by default
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Port used when `PORT` is unset
pub const DEFAULT_PORT: u16 = 8080;
/// Route prefix used when `API_BASE_PATH` is unset
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Where the HTTP server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Route prefix without a trailing slash; empty means routes sit at the root.
    pub base_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

/// `api` and `/api/` become `/api`; `/` and blank become the empty prefix.
#[must_use]
pub fn normalize_base_path(value: &str) -> String {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

impl ServerSettings {
    /// Reads `SERVER_HOST`, `SERVER_PORT` and `API_BASE_PATH` through `lookup`,
    /// falling back to the defaults for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("SERVER_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| Error::Config {
                message: format!("SERVER_PORT must be a port number, got '{raw}'"),
            })?,
            None => defaults.port,
        };
        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port,
            base_path: normalize_base_path(
                &lookup("API_BASE_PATH").unwrap_or(defaults.base_path),
            ),
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config {
                message: format!("Invalid bind address {}:{}: {e}", self.host, self.port),
            })
    }
}
