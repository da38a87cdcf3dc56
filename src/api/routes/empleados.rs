//! Employee directory. Responses never include RFC, CURP or password hashes.

use crate::{
    api::{
        AppState,
        extract::{JsonBody, Params},
        response::Reply,
    },
    core::colaborador::{self, ColaboradorInput, Credentials},
    entities::ColaboradorModel,
    errors::{Error, Result},
};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

pub async fn get(State(state): State<AppState>, params: Params) -> Result<Response> {
    if let Some(id) = params.id()? {
        let colaborador = colaborador::get_colaborador_by_id(&state.db, id)
            .await?
            .ok_or(Error::ColaboradorNotFound { id })?;
        return Ok(Reply::ok(colaborador).into_response());
    }
    Ok(Reply::ok(colaborador::get_all_colaboradores(&state.db).await?).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ColaboradorInput>,
) -> Result<Reply<Value>> {
    let created = colaborador::create_colaborador(
        &state.db,
        &state.cipher,
        &state.passwords,
        &input,
        Credentials::Optional,
    )
    .await?;
    Ok(Reply::created(
        "Colaborador creado exitosamente",
        json!({ "id_colaborador": created.id_colaborador }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    params: Params,
    JsonBody(input): JsonBody<ColaboradorInput>,
) -> Result<Reply<ColaboradorModel>> {
    let id = params.require_id()?;
    let updated = colaborador::update_colaborador(&state.db, id, &input).await?;
    Ok(Reply::with_message("Colaborador actualizado exitosamente", updated))
}

pub async fn delete(State(state): State<AppState>, params: Params) -> Result<Reply<()>> {
    let id = params.require_id()?;
    colaborador::delete_colaborador(&state.db, id).await?;
    Ok(Reply::message("Colaborador eliminado exitosamente"))
}
