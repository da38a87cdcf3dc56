//! Loyalty-program endpoints: dedicated registration and login routes plus the
//! combined `action`-based controller.

use crate::{
    api::{
        AppState,
        extract::{JsonBody, Params},
        response::Reply,
    },
    core::{
        auth::Sesion,
        cliente::{self, LoginClienteInput, RegistroClienteInput, UsuarioCliente},
    },
    errors::{Error, Result},
};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

async fn do_registro(state: &AppState, input: &RegistroClienteInput) -> Result<Reply<Value>> {
    let cliente = cliente::register_cliente(&state.db, &state.passwords, input).await?;
    Ok(Reply::created(
        format!(
            "Registro exitoso. Tu código de cliente es: {}",
            cliente.codigo_cliente
        ),
        json!({
            "id_cliente": cliente.id_cliente,
            "codigo_cliente": cliente.codigo_cliente,
            "nombre": cliente.nombre,
        }),
    ))
}

async fn do_login(
    state: &AppState,
    input: &LoginClienteInput,
) -> Result<Reply<Sesion<UsuarioCliente>>> {
    let sesion =
        cliente::login_cliente(&state.db, &state.passwords, &state.tokens, input).await?;
    Ok(Reply::with_message("Inicio de sesión exitoso", sesion))
}

pub async fn registro(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegistroClienteInput>,
) -> Result<Reply<Value>> {
    do_registro(&state, &input).await
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginClienteInput>,
) -> Result<Reply<Sesion<UsuarioCliente>>> {
    do_login(&state, &input).await
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::MalformedJson {
        message: e.to_string(),
    })
}

/// Dispatches on `action` (`registro` or `login`), read from the body or, failing
/// that, the query string.
pub async fn dispatch(
    State(state): State<AppState>,
    params: Params,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response> {
    let action = body
        .get("action")
        .and_then(Value::as_str)
        .or_else(|| params.get("action"))
        .unwrap_or_default()
        .to_string();

    match action.as_str() {
        "registro" => Ok(do_registro(&state, &from_value(body)?).await?.into_response()),
        "login" => Ok(do_login(&state, &from_value(body)?).await?.into_response()),
        _ => Err(Error::validation(
            "Acción no válida. Use 'registro' o 'login'.",
        )),
    }
}
