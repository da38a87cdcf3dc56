//! Application configuration assembled from the environment and an optional
//! `config.toml`.

/// Database settings, connection and table creation
pub mod database;
/// Encryption, token and password-hashing settings
pub mod security;
/// Category seeds from config.toml
pub mod seed;
/// Bind address and route prefix
pub mod server;

use crate::errors::Result;
use database::DatabaseSettings;
use security::SecuritySettings;
use seed::SeedConfig;
use server::ServerSettings;
use tracing::{info, instrument};

/// Everything the process needs to start.
#[derive(Debug)]
pub struct AppConfig {
    /// Connection settings
    pub database: DatabaseSettings,
    /// Bind address and route prefix
    pub server: ServerSettings,
    /// Secrets and cost factors
    pub security: SecuritySettings,
    /// Categories created at startup
    pub seed: SeedConfig,
}

impl AppConfig {
    /// Builds the configuration from `lookup`. The seed file path comes from
    /// `SEED_CONFIG_PATH` and defaults to `config.toml`; a missing file is fine.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let seed_path =
            lookup("SEED_CONFIG_PATH").unwrap_or_else(|| seed::DEFAULT_SEED_PATH.to_string());
        Ok(Self {
            database: DatabaseSettings::from_lookup(&lookup)?,
            server: ServerSettings::from_lookup(&lookup)?,
            security: SecuritySettings::from_lookup(&lookup)?,
            seed: seed::load_optional_seed_config(seed_path)?,
        })
    }
}

/// Loads the configuration from the process environment.
#[instrument]
pub fn load_app_configuration() -> Result<AppConfig> {
    let config = AppConfig::from_lookup(|key| std::env::var(key).ok())?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        base_path = %config.server.base_path,
        seed_categorias = config.seed.categorias.len(),
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_from_lookup_with_minimal_environment() {
        let config = AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "ENCRYPTION_KEY" => Some("clave".to_string()),
            "SEED_CONFIG_PATH" => Some("no/existe.toml".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(matches!(
            &config.database,
            database::DatabaseSettings::Url(url) if url == "sqlite::memory:"
        ));
        assert_eq!(config.server.base_path, "/api");
        assert!(config.seed.categorias.is_empty());
    }
}
