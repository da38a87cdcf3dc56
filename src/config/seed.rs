//! Category seed list loaded from `config.toml`.
//!
//! The file is optional. Categories listed under `[[categorias]]` are created at
//! startup when no category with the same name exists.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Seed file read when `SEED_FILE` is unset
pub const DEFAULT_SEED_PATH: &str = "config.toml";

/// Contents of the seed file
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    /// `[[categorias]]` entries
    #[serde(default)]
    pub categorias: Vec<CategoriaSeed>,
}

/// One category to seed
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriaSeed {
    /// Category name
    pub nombre: String,
    /// Optional description
    #[serde(default)]
    pub descripcion: Option<String>,
}

/// Parses a seed file.
///
/// # Errors
/// Returns `Error::Config` when the file cannot be read or is not valid TOML.
pub fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path = path.as_ref();
    debug!("Loading seed configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Like [`load_seed_config`], but a missing file yields an empty seed list.
pub fn load_optional_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No seed file at {}; skipping category seeding", path.display());
        return Ok(SeedConfig::default());
    }
    load_seed_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_seed_config() {
        let toml_str = r#"
            [[categorias]]
            nombre = "Lácteos"
            descripcion = "Leche, quesos y cremas"

            [[categorias]]
            nombre = "Bebidas"
        "#;

        let config: SeedConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.categorias.len(), 2);
        assert_eq!(config.categorias[0].nombre, "Lácteos");
        assert_eq!(config.categorias[1].descripcion, None);
    }

    #[test]
    fn test_empty_file_has_no_categorias() {
        let config: SeedConfig = toml::from_str("").unwrap();
        assert!(config.categorias.is_empty());
    }

    #[test]
    fn test_missing_file_is_optional() {
        let config = load_optional_seed_config("no/existe/config.toml").unwrap();
        assert!(config.categorias.is_empty());
        assert!(load_seed_config("no/existe/config.toml").is_err());
    }
}
