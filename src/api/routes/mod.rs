//! Route table. Paths keep their `.php` names so the existing frontend works
//! unchanged.

mod auth;
mod categorias;
mod clientes;
mod empleados;
mod insumos;
mod registro;
mod sesion;

use crate::{api::AppState, errors::Error};
use axum::{
    Router,
    http::StatusCode,
    routing::{MethodRouter, get, post},
};

/// Answers a non-preflight `OPTIONS` with an empty 200.
async fn options() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}

/// Adds the `OPTIONS` handler and the enveloped 405 for other methods.
fn finish(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.options(options).fallback(method_not_allowed)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/categorias.php",
            finish(
                get(categorias::get)
                    .post(categorias::create)
                    .put(categorias::update)
                    .delete(categorias::delete),
            ),
        )
        .route(
            "/insumos.php",
            finish(
                get(insumos::get)
                    .post(insumos::create)
                    .put(insumos::update)
                    .delete(insumos::delete),
            ),
        )
        .route(
            "/empleados.php",
            finish(
                get(empleados::get)
                    .post(empleados::create)
                    .put(empleados::update)
                    .delete(empleados::delete),
            ),
        )
        .route(
            "/registro.php",
            finish(
                get(registro::get)
                    .post(registro::create)
                    .put(registro::update)
                    .delete(registro::delete),
            ),
        )
        .route("/login.php", finish(post(auth::login)))
        .route("/clientes.php", finish(post(clientes::dispatch)))
        .route("/clientes/registro.php", finish(post(clientes::registro)))
        .route("/clientes/login.php", finish(post(clientes::login)))
        .route("/sesion.php", finish(get(sesion::current)))
}
