use crate::{
    api::{
        AppState,
        extract::{JsonBody, Params},
        response::Reply,
    },
    core::insumo::{self, InsumoInput},
    entities::InsumoModel,
    errors::{Error, Result},
};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

/// A category filter that is not a positive integer is ignored.
fn categoria_filter(raw: Option<&str>) -> Option<i32> {
    raw?.parse::<i32>().ok().filter(|id| *id > 0)
}

/// `?id=` returns one supply; otherwise `?categoria=` filters by category and
/// `?search=` by name. Without parameters every supply is listed.
pub async fn get(State(state): State<AppState>, params: Params) -> Result<Response> {
    if let Some(id) = params.id()? {
        let insumo = insumo::get_insumo_by_id(&state.db, id)
            .await?
            .ok_or(Error::InsumoNotFound { id })?;
        return Ok(Reply::ok(insumo).into_response());
    }

    let insumos = if let Some(id_categoria) = categoria_filter(params.get("categoria")) {
        insumo::get_insumos_by_categoria(&state.db, id_categoria).await?
    } else if let Some(term) = params.get("search") {
        insumo::search_insumos(&state.db, term).await?
    } else {
        insumo::get_all_insumos(&state.db).await?
    };
    Ok(Reply::ok(insumos).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<InsumoInput>,
) -> Result<Reply<InsumoModel>> {
    let created = insumo::create_insumo(&state.db, &input).await?;
    Ok(Reply::created("Insumo creado exitosamente", created))
}

pub async fn update(
    State(state): State<AppState>,
    params: Params,
    JsonBody(input): JsonBody<InsumoInput>,
) -> Result<Reply<InsumoModel>> {
    let id = params.require_id()?;
    let updated = insumo::update_insumo(&state.db, id, &input).await?;
    Ok(Reply::with_message("Insumo actualizado exitosamente", updated))
}

pub async fn delete(State(state): State<AppState>, params: Params) -> Result<Reply<()>> {
    let id = params.require_id()?;
    insumo::delete_insumo(&state.db, id).await?;
    Ok(Reply::message("Insumo eliminado exitosamente"))
}
