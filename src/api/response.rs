//! JSON envelope shared by every endpoint: `{success, message?, data?}`.

use crate::errors::Error;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// JSON body of every response: `{success, message?, data?}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// `false` for every error response
    pub success: bool,
    /// Human-readable outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// A successful reply: status plus envelope.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T> Reply<T> {
    /// 200 with `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                success: true,
                message: None,
                data: Some(data),
            },
        }
    }

    /// 200 with a message and `data`.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                success: true,
                message: Some(message.into()),
                data: Some(data),
            },
        }
    }

    /// 201 with a message and `data`.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::with_message(message, data)
        }
    }
}

impl Reply<()> {
    /// 200 with only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                success: true,
                message: Some(message.into()),
                data: None,
            },
        }
    }
}

/// Serializes `body` with the UTF-8 JSON content type. Non-ASCII text is
/// written as-is, not `\u` escaped.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to serialize response body: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        json_response(self.status, &self.body)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else if status == StatusCode::UNAUTHORIZED {
            warn!("Unauthorized: {}", self);
        }

        json_response(
            status,
            &Envelope::<()> {
                success: false,
                message: Some(self.public_message()),
                data: None,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = Error::CategoriaNotFound { id: 3 }.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        let body = body_of(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Categoría no encontrada");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_created_reply_keeps_unicode() {
        let response = Reply::created("Categoría creada exitosamente", 7).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("Categoría"));
        assert!(text.contains(r#""data":7"#));
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response =
            Error::Database(sea_orm::DbErr::Custom("secret driver text".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["message"], "Error de base de datos");
    }
}
