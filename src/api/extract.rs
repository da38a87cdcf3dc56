//! Request extractors: JSON bodies, query parameters and bearer sessions.

use crate::{
    api::AppState,
    core::token::Claims,
    errors::{Error, Result},
};
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Parses a request body. Blank bodies, `null`, `{}` and `[]` count as missing
/// data; anything that is not valid JSON for `T` is malformed.
pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::validation("Datos requeridos"));
    }
    let value: Value = serde_json::from_slice(bytes).map_err(|e| Error::MalformedJson {
        message: e.to_string(),
    })?;
    let empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };
    if empty {
        return Err(Error::validation("Datos requeridos"));
    }
    serde_json::from_value(value).map_err(|e| Error::MalformedJson {
        message: e.to_string(),
    })
}

/// JSON body extractor that reports failures in the API envelope.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| Error::MalformedJson {
                message: e.body_text(),
            })?;
        parse_body(&bytes).map(Self)
    }
}

/// Checks a raw `id`-style parameter. Blank means absent.
///
/// # Errors
/// `ID inválido` when not an integer, `ID debe ser un número positivo` when ≤ 0.
pub fn parse_id(raw: Option<&str>) -> Result<Option<i32>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let id: i64 = raw.parse().map_err(|_| Error::validation("ID inválido"))?;
    if id <= 0 {
        return Err(Error::validation("ID debe ser un número positivo"));
    }
    i32::try_from(id)
        .map(Some)
        .map_err(|_| Error::validation("ID inválido"))
}

/// Query-string parameters.
#[derive(Debug, Default)]
pub struct Params(HashMap<String, String>);

impl Params {
    /// A parameter with surrounding whitespace removed; blank counts as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The `id` parameter, validated with [`parse_id`].
    pub fn id(&self) -> Result<Option<i32>> {
        parse_id(self.0.get("id").map(String::as_str))
    }

    /// The `id` parameter; absent is an error.
    pub fn require_id(&self) -> Result<i32> {
        self.id()?
            .ok_or_else(|| Error::validation("ID requerido"))
    }
}

impl<S> FromRequestParts<S> for Params
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Query(map) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::validation(e.body_text()))?;
        Ok(Self(map))
    }
}

/// Verified claims from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Claims);

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts).ok_or(Error::InvalidToken)?;
        state.tokens.verify(token).map(Self)
    }
}
