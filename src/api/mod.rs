//! HTTP layer: shared state, the route table and the server loop.
//!
//! Every response, success or failure, is a JSON envelope
//! `{success, message?, data?}`. CORS is open to any origin.

/// Request extractors
pub mod extract;
/// JSON envelope and error rendering
pub mod response;
mod routes;

use crate::{
    config::{security::SecuritySettings, server::ServerSettings},
    core::{crypto::FieldCipher, password::PasswordHasher, token::TokenIssuer},
    errors::Result,
};
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// RFC/CURP encryption and blind index
    pub cipher: Arc<FieldCipher>,
    /// bcrypt hashing on the blocking pool
    pub passwords: PasswordHasher,
    /// Session token signing
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    /// Builds the security primitives from `security`.
    ///
    /// # Errors
    /// Returns `Error::Config` when a secret is empty or the token lifetime is invalid.
    pub fn new(db: DatabaseConnection, security: &SecuritySettings) -> Result<Self> {
        Ok(Self {
            db,
            cipher: Arc::new(FieldCipher::new(&security.encryption_key)?),
            passwords: PasswordHasher::new(security.bcrypt_cost),
            tokens: Arc::new(TokenIssuer::new(
                &security.token_secret,
                security.token_ttl_secs,
            )?),
        })
    }
}

/// The full application mounted under `base_path` (empty for the root).
pub fn app(state: AppState, base_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let routes = routes::router();
    let router = if base_path.is_empty() {
        Router::new().merge(routes)
    } else {
        Router::new().nest(base_path, routes)
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState, settings: &ServerSettings) -> Result<()> {
    let address = settings.bind_addr()?;
    let listener = TcpListener::bind(address).await?;
    info!(%address, base_path = %settings.base_path, "Server listening");

    axum::serve(listener, app(state, &settings.base_path))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> Result<Router> {
        let db = setup_test_db().await?;
        Ok(app(test_state(db), "/api"))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_options_and_unsupported_method() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/categorias.php")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );

        let (status, body) = send(&app, empty_request(Method::PATCH, "/api/categorias.php")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"success": false, "message": "Método no permitido"}));

        let (status, _) = send(&app, empty_request(Method::GET, "/api/login.php")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        Ok(())
    }

    #[tokio::test]
    async fn test_categoria_lifecycle_over_http() -> Result<()> {
        let app = test_app().await?;

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/categorias.php",
                &json!({"nombre": "Lácteos", "descripcion": "Leche y quesos"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // Unicode is written unescaped
        assert!(std::str::from_utf8(&bytes).unwrap().contains("Lácteos"));
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Categoría creada exitosamente");
        let id = body["data"]["id_categoria"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            empty_request(Method::GET, &format!("/api/categorias.php?id={id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nombre"], "Lácteos");

        let (status, body) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/categorias.php?id={id}"),
                &json!({"nombre": "Lácteos y huevo"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nombre"], "Lácteos y huevo");
        assert_eq!(body["data"]["descripcion"], Value::Null);

        let (status, body) = send(
            &app,
            empty_request(Method::DELETE, &format!("/api/categorias.php?id={id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Categoría eliminada exitosamente");

        let (status, body) = send(&app, empty_request(Method::GET, "/api/categorias.php")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));

        let (status, body) = send(
            &app,
            empty_request(Method::GET, &format!("/api/categorias.php?id={id}")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Categoría no encontrada");

        Ok(())
    }

    #[tokio::test]
    async fn test_request_errors_use_the_envelope() -> Result<()> {
        let app = test_app().await?;

        let (status, body) = send(&app, json_request(Method::POST, "/api/categorias.php", &json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "message": "Datos requeridos"}));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/categorias.php")
            .body(Body::from("{nombre"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().starts_with("JSON inválido"));

        let (status, body) = send(&app, empty_request(Method::GET, "/api/insumos.php?id=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "ID inválido");

        let (status, body) = send(&app, empty_request(Method::DELETE, "/api/insumos.php")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "ID requerido");

        Ok(())
    }

    #[tokio::test]
    async fn test_insumo_filters_over_http() -> Result<()> {
        let db = setup_test_db().await?;
        let lacteos = create_test_categoria(&db, "Lácteos").await?;
        let bebidas = create_test_categoria(&db, "Bebidas").await?;
        create_test_insumo(&db, "Leche", lacteos.id_categoria, 10).await?;
        create_test_insumo(&db, "Agua", bebidas.id_categoria, 5).await?;
        let app = app(test_state(db), "/api");

        let (_, body) = send(
            &app,
            empty_request(
                Method::GET,
                &format!("/api/insumos.php?categoria={}", bebidas.id_categoria),
            ),
        )
        .await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["nombre"], "Agua");
        assert_eq!(body["data"][0]["categoria_nombre"], "Bebidas");

        let (_, body) = send(&app, empty_request(Method::GET, "/api/insumos.php?search=ech")).await;
        assert_eq!(body["data"][0]["nombre"], "Leche");

        // A non-numeric category filter is ignored
        let (status, body) = send(&app, empty_request(Method::GET, "/api/insumos.php?categoria=x")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_staff_login_and_session() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_colaborador(&db, &test_cipher(), &test_hasher(), "luis@restaurante.mx").await?;
        let app = app(test_state(db), "/api");

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/login.php",
                &json!({"correo": "luis@restaurante.mx", "contrasena": TEST_PASSWORD}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Inicio de sesión exitoso");
        assert_eq!(body["data"]["usuario"]["rfc"], "ABCD****XY1");
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let request = Request::builder()
            .uri("/api/sesion.php")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["correo"], "luis@restaurante.mx");
        assert_eq!(body["data"]["rol"], "empleado");

        let request = Request::builder()
            .uri("/api/sesion.php")
            .header(AUTHORIZATION, "Bearer no-es-un-token")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token inválido o expirado");

        let (status, _) = send(&app, empty_request(Method::GET, "/api/sesion.php")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/login.php",
                &json!({"correo": "luis@restaurante.mx", "contrasena": "incorrecta"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Correo o contraseña incorrectos");

        Ok(())
    }

    #[tokio::test]
    async fn test_registro_and_empleados_views() -> Result<()> {
        let app = test_app().await?;

        let mut input = json!({
            "nombre": "Ana",
            "apellido": "García",
            "correo": "ana@restaurante.mx",
            "telefono": "5512345678",
            "cargo": "Cocinera",
            "rfc": TEST_RFC,
            "curp": TEST_CURP,
            "contrasena": TEST_PASSWORD,
        });
        let (status, body) = send(&app, json_request(Method::POST, "/api/registro.php", &input)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id_colaborador"].as_i64().unwrap();

        let (status, body) = send(&app, json_request(Method::POST, "/api/registro.php", &input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "El correo electrónico ya está registrado");

        let (_, body) = send(
            &app,
            empty_request(Method::GET, &format!("/api/registro.php?rfc={}", TEST_RFC.to_lowercase())),
        )
        .await;
        assert_eq!(body["data"]["id_colaborador"].as_i64(), Some(id));
        assert_eq!(body["data"]["rfc"], TEST_RFC);

        let (_, body) = send(&app, empty_request(Method::GET, &format!("/api/empleados.php?id={id}"))).await;
        assert_eq!(body["data"]["posicion"], "Cocinera");
        assert!(body["data"].get("rfc").is_none());
        assert!(body["data"].get("contrasena").is_none());

        input["correo"] = json!("ana.garcia@restaurante.mx");
        input["contrasena"] = json!("");
        let (status, body) = send(
            &app,
            json_request(Method::PUT, &format!("/api/registro.php?id={id}"), &input),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Usuario actualizado correctamente");

        // The password survived the update
        let (status, _) = send(
            &app,
            json_request(
                Method::POST,
                "/api/login.php",
                &json!({"correo": "ana.garcia@restaurante.mx", "contrasena": TEST_PASSWORD}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, empty_request(Method::DELETE, &format!("/api/empleados.php?id={id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Colaborador eliminado exitosamente");

        Ok(())
    }

    #[tokio::test]
    async fn test_clientes_dispatch() -> Result<()> {
        let app = test_app().await?;

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/clientes.php",
                &json!({
                    "action": "registro",
                    "nombre": "Carla Ruiz",
                    "correo": "carla@correo.mx",
                    "telefono": "55 1234 5678",
                    "direccion_entrega": "Av. Juárez 10",
                    "contrasena": TEST_PASSWORD,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let codigo = body["data"]["codigo_cliente"].as_str().unwrap().to_string();
        assert!(codigo.starts_with("CLI-"));
        assert_eq!(
            body["message"],
            format!("Registro exitoso. Tu código de cliente es: {codigo}")
        );

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/clientes.php?action=login",
                &json!({"correo_o_telefono": "5512345678", "contrasena": TEST_PASSWORD}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["usuario"]["codigo_cliente"], codigo.as_str());
        assert_eq!(body["data"]["usuario"]["tipo"], "cliente");
        assert_eq!(body["data"]["usuario"]["bonos"], 0);

        let (status, body) = send(
            &app,
            json_request(Method::POST, "/api/clientes.php", &json!({"action": "borrar"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Acción no válida. Use 'registro' o 'login'.");

        Ok(())
    }

    #[tokio::test]
    async fn test_root_base_path() -> Result<()> {
        let db = setup_test_db().await?;
        let app = app(test_state(db), "");

        let (status, body) = send(&app, empty_request(Method::GET, "/categorias.php")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": []}));

        Ok(())
    }
}
