use crate::{
    api::{AppState, extract::JsonBody, response::Reply},
    core::auth::{self, LoginInput, Sesion, UsuarioColaborador},
    errors::Result,
};
use axum::extract::State;

pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<Reply<Sesion<UsuarioColaborador>>> {
    let sesion = auth::login_colaborador(
        &state.db,
        &state.cipher,
        &state.passwords,
        &state.tokens,
        &input,
    )
    .await?;
    Ok(Reply::with_message("Inicio de sesión exitoso", sesion))
}
