//! Unified error type for configuration, business logic and the HTTP layer.
//!
//! Variants carrying a user-facing message render it verbatim; the API layer maps
//! each variant onto an HTTP status (see [`Error::status_code`]).

use axum::http::StatusCode;
use thiserror::Error;

/// Every failure the crate can report
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration at startup
    #[error("Configuration error: {message}")]
    Config {
        /// What is missing or invalid
        message: String,
    },

    /// Field-level validation failure (missing field, bad format, length bounds).
    #[error("{message}")]
    Validation {
        /// Shown to the client as is
        message: String,
    },

    /// Request body could not be parsed as JSON.
    #[error("JSON inválido: {message}")]
    MalformedJson {
        /// Parser error
        message: String,
    },

    /// A unique value (email, phone, RFC, CURP, name) is already taken.
    #[error("{message}")]
    Duplicate {
        /// Names the taken field
        message: String,
    },

    /// A category still referenced by supplies or products cannot be deleted.
    #[error("{}", categoria_in_use_message(*insumos, *productos))]
    CategoriaInUse {
        /// Supplies in the category
        insumos: u64,
        /// Products in the category
        productos: u64,
    },

    /// No category with this id
    #[error("Categoría no encontrada")]
    CategoriaNotFound {
        /// Requested id
        id: i32,
    },

    /// No supply with this id
    #[error("Insumo no encontrado")]
    InsumoNotFound {
        /// Requested id
        id: i32,
    },

    /// No staff member with this id
    #[error("Colaborador no encontrado")]
    ColaboradorNotFound {
        /// Requested id
        id: i32,
    },

    /// Every generated customer code collided with an existing one.
    #[error("No se pudo generar un código de cliente único. Intenta de nuevo.")]
    CodigoClienteExhausted,

    /// Staff login failed
    #[error("Correo o contraseña incorrectos")]
    InvalidCredentials,

    /// Loyalty login failed
    #[error("Correo/teléfono o contraseña incorrectos.")]
    InvalidClientCredentials,

    /// Missing, malformed, forged or expired bearer token
    #[error("Token inválido o expirado")]
    InvalidToken,

    /// HTTP method not served by the route
    #[error("Método no permitido")]
    MethodNotAllowed,

    /// Driver or query failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// bcrypt failure while hashing
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Token encoding failure
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Socket or file failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn categoria_in_use_message(insumos: u64, productos: u64) -> String {
    let mut parts = Vec::with_capacity(2);
    if insumos > 0 {
        parts.push(format!("{insumos} insumo(s)"));
    }
    if productos > 0 {
        parts.push(format!("{productos} producto(s)"));
    }
    format!(
        "No se puede eliminar la categoría porque tiene {} asociado(s)",
        parts.join(" y ")
    )
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with a static message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Duplicate`] with a static message.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::MalformedJson { .. }
            | Self::Duplicate { .. }
            | Self::CategoriaInUse { .. }
            | Self::CodigoClienteExhausted => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::InvalidClientCredentials | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::CategoriaNotFound { .. }
            | Self::InsumoNotFound { .. }
            | Self::ColaboradorNotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Config { .. }
            | Self::Database(_)
            | Self::PasswordHash(_)
            | Self::Token(_)
            | Self::Io(_)
            | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to API clients. Server-side failures are not described in
    /// detail; the full error is logged instead.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) => "Error de base de datos".to_string(),
            Self::Config { .. }
            | Self::PasswordHash(_)
            | Self::Token(_)
            | Self::Io(_)
            | Self::Task(_) => {
                "Error interno del servidor".to_string()
            }
            other => other.to_string(),
        }
    }
}

// Convenience `Result` type
/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// The index or column named by a unique-violation message, lower-cased.
///
/// MySQL reports `Duplicate entry '<value>' for key '<table>.<index>'` and
/// SQLite `UNIQUE constraint failed: <table>.<column>`. Only the part after the
/// marker is kept so the offending value never influences the result.
#[must_use]
pub fn unique_violation_target(detail: &str) -> String {
    let target = detail
        .rsplit_once("for key")
        .or_else(|| detail.rsplit_once("constraint failed:"))
        .map_or(detail, |(_, target)| target);
    target
        .trim()
        .trim_matches(|c: char| matches!(c, '\'' | '"' | '`'))
        .to_lowercase()
}

/// The target of `err` when it is a unique-constraint violation.
#[must_use]
pub fn unique_violation(err: &sea_orm::DbErr) -> Option<String> {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
            Some(unique_violation_target(&detail))
        }
        _ => None,
    }
}
