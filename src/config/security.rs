//! Secrets and cost factors for encryption, tokens and password hashing.

use crate::errors::{Error, Result};
use tracing::warn;

/// Default session lifetime: 8 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 8 * 60 * 60;
/// bcrypt cost used when `BCRYPT_COST` is unset
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Secrets and cost factors. `Debug` hides the secrets.
#[derive(Clone)]
pub struct SecuritySettings {
    /// Key material for RFC/CURP encryption and the blind index
    pub encryption_key: String,
    /// HS256 signing secret for session tokens
    pub token_secret: String,
    /// Session lifetime in seconds
    pub token_ttl_secs: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| Error::Config {
            message: format!("{key} has an invalid value '{raw}'"),
        }),
        None => Ok(default),
    }
}

impl SecuritySettings {
    /// Reads `ENCRYPTION_KEY` (required), `TOKEN_SECRET`, `TOKEN_TTL_SECS` and
    /// `BCRYPT_COST` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let encryption_key = lookup("ENCRYPTION_KEY")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config {
                message: "ENCRYPTION_KEY environment variable not set".to_string(),
            })?;

        let token_secret = match lookup("TOKEN_SECRET").filter(|v| !v.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("TOKEN_SECRET not set; signing session tokens with ENCRYPTION_KEY");
                encryption_key.clone()
            }
        };

        let token_ttl_secs = parse_or(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if token_ttl_secs <= 0 {
            return Err(Error::Config {
                message: "TOKEN_TTL_SECS must be positive".to_string(),
            });
        }

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(Error::Config {
                message: format!("BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"),
            });
        }

        Ok(Self {
            encryption_key,
            token_secret,
            token_ttl_secs,
            bcrypt_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_token_secret_falls_back_to_encryption_key() {
        let settings = SecuritySettings::from_lookup(|key| {
            (key == "ENCRYPTION_KEY").then(|| "clave".to_string())
        })
        .unwrap();
        assert_eq!(settings.token_secret, "clave");
        assert_eq!(settings.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(settings.bcrypt_cost, DEFAULT_BCRYPT_COST);
        assert!(!format!("{settings:?}").contains("clave"));
    }

    #[test]
    fn test_encryption_key_required() {
        assert!(matches!(
            SecuritySettings::from_lookup(|_| None),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let bad_cost = SecuritySettings::from_lookup(|key| match key {
            "ENCRYPTION_KEY" => Some("clave".to_string()),
            "BCRYPT_COST" => Some("99".to_string()),
            _ => None,
        });
        assert!(bad_cost.is_err());

        let bad_ttl = SecuritySettings::from_lookup(|key| match key {
            "ENCRYPTION_KEY" => Some("clave".to_string()),
            "TOKEN_TTL_SECS" => Some("pronto".to_string()),
            _ => None,
        });
        assert!(bad_ttl.is_err());
    }
}
