//! bcrypt password hashing.
//!
//! Hashes produced by PHP's `password_hash` (`$2y$` prefix) verify unchanged, so
//! accounts migrated from the previous backend keep their passwords.
//!
//! bcrypt is CPU-bound by design, so both operations run on tokio's blocking
//! pool instead of a request worker.

use crate::errors::Result;
use tokio::task;
use tracing::warn;

/// Hashes and verifies passwords with a fixed bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Hasher with the given bcrypt cost.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes `password` on the blocking pool.
    pub async fn hash(&self, password: &str) -> Result<String> {
        let (password, cost) = (password.to_string(), self.cost);
        task::spawn_blocking(move || bcrypt::hash(password, cost)).await?.map_err(Into::into)
    }

    /// `Ok(false)` for a wrong password and for a malformed stored hash.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let (password, stored_hash) = (password.to_string(), stored_hash.to_string());
        let verified = task::spawn_blocking(move || {
            bcrypt::verify(password, &stored_hash).unwrap_or_else(|e| {
                warn!("Stored password hash could not be parsed: {}", e);
                false
            })
        })
        .await?;
        Ok(verified)
    }
}
