//! Staff registration surface. Credentials are mandatory and responses carry
//! the decrypted RFC and CURP.

use crate::{
    api::{
        AppState,
        extract::{JsonBody, Params},
        response::Reply,
    },
    core::colaborador::{self, ColaboradorDetalle, ColaboradorInput, Credentials},
    errors::{Error, Result},
};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// `?id=`, `?rfc=` or `?curp=` return one staff member; otherwise all of them.
pub async fn get(State(state): State<AppState>, params: Params) -> Result<Response> {
    let found = if let Some(id) = params.id()? {
        colaborador::get_colaborador_by_id(&state.db, id)
            .await?
            .ok_or(Error::ColaboradorNotFound { id })?
    } else if let Some(rfc) = params.get("rfc") {
        colaborador::find_by_rfc(&state.db, &state.cipher, rfc)
            .await?
            .ok_or(Error::ColaboradorNotFound { id: 0 })?
    } else if let Some(curp) = params.get("curp") {
        colaborador::find_by_curp(&state.db, &state.cipher, curp)
            .await?
            .ok_or(Error::ColaboradorNotFound { id: 0 })?
    } else {
        let all: Vec<_> = colaborador::get_all_colaboradores(&state.db)
            .await?
            .into_iter()
            .map(|c| ColaboradorDetalle::new(c, &state.cipher))
            .collect();
        return Ok(Reply::ok(all).into_response());
    };
    Ok(Reply::ok(ColaboradorDetalle::new(found, &state.cipher)).into_response())
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
        Credentials::Required,
    )
    .await?;
    Ok(Reply::created(
        "Colaborador registrado exitosamente",
        json!({ "id_colaborador": created.id_colaborador }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    params: Params,
    JsonBody(input): JsonBody<ColaboradorInput>,
) -> Result<Reply<Value>> {
    let id = params.require_id()?;
    let updated = colaborador::update_colaborador_registro(
        &state.db,
        &state.cipher,
        &state.passwords,
        id,
        &input,
    )
    .await?;
    Ok(Reply::with_message(
        "Usuario actualizado correctamente",
        json!({ "id_colaborador": updated.id_colaborador }),
    ))
}

pub async fn delete(State(state): State<AppState>, params: Params) -> Result<Reply<()>> {
    let id = params.require_id()?;
    colaborador::delete_colaborador(&state.db, id).await?;
    Ok(Reply::message("Usuario eliminado correctamente"))
}
