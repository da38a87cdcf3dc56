//! Signed, expiring session tokens (HS256 JWT).
//!
//! Tokens carry the account id, its role and its login identifier. They are
//! verified on every use; a token with a bad signature or past its `exp` is
//! rejected with [`Error::InvalidToken`].

use crate::{
    entities::Rol,
    errors::{Error, Result},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id (`id_colaborador` or `id_cliente`)
    pub sub: i32,
    /// Role used for authorization
    pub rol: Rol,
    /// Login email
    pub correo: String,
    /// Customer code, only for loyalty customers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_cliente: Option<String>,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// The account a token is being issued for.
#[derive(Debug, Clone)]
pub struct Subject {
    /// Account id
    pub id: i32,
    /// Role used for authorization
    pub rol: Rol,
    /// Login email
    pub correo: String,
    /// Customer code for loyalty accounts
    pub codigo_cliente: Option<String>,
}

/// Issues and verifies session tokens with a shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Issuer signing with `secret`.
    ///
    /// # Errors
    /// Returns `Error::Config` for an empty secret.
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config {
                message: "Token signing secret must not be empty".to_string(),
            });
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        })
    }

    /// Token lifetime in seconds
    #[must_use]
    pub const fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issues a token valid from now for the configured lifetime.
    pub fn issue(&self, subject: &Subject) -> Result<String> {
        self.issue_at(subject, chrono::Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, subject: &Subject, now: i64) -> Result<String> {
        let claims = Claims {
            sub: subject.id,
            rol: subject.rol,
            correo: subject.correo.clone(),
            codigo_cliente: subject.codigo_cliente.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(Into::into)
    }

    /// Verifies signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected session token: {}", e);
                Error::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn gerente() -> Subject {
        Subject {
            id: 7,
            rol: Rol::Gerente,
            correo: "gerente@restaurante.mx".to_string(),
            codigo_cliente: None,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = TokenIssuer::new("secreto", 3600).unwrap();
        let token = issuer.issue(&gerente()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.rol, Rol::Gerente);
        assert_eq!(claims.correo, "gerente@restaurante.mx");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = TokenIssuer::new("secreto", 60).unwrap();
        let two_hours_ago = chrono::Utc::now().timestamp() - 7200;
        let token = issuer.issue_at(&gerente(), two_hours_ago).unwrap();
        assert!(matches!(issuer.verify(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let token = TokenIssuer::new("otro-secreto", 3600)
            .unwrap()
            .issue(&gerente())
            .unwrap();
        let issuer = TokenIssuer::new("secreto", 3600).unwrap();
        assert!(matches!(issuer.verify(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_legacy_base64_token_is_rejected() {
        // The previous backend handed out base64("id:correo:timestamp").
        let issuer = TokenIssuer::new("secreto", 3600).unwrap();
        let legacy = "Nzpnb3JlbnRlQHJlc3RhdXJhbnRlLm14OjE3MDAwMDAwMDA=";
        assert!(matches!(issuer.verify(legacy), Err(Error::InvalidToken)));
    }
}
