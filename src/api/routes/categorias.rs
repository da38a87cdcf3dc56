use crate::{
    api::{
        AppState,
        extract::{JsonBody, Params},
        response::Reply,
    },
    core::categoria::{self, CategoriaInput},
    entities::CategoriaModel,
    errors::{Error, Result},
};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

/// `?id=` returns one category, otherwise all of them ordered by name.
pub async fn get(State(state): State<AppState>, params: Params) -> Result<Response> {
    if let Some(id) = params.id()? {
        let categoria = categoria::get_categoria_by_id(&state.db, id)
            .await?
            .ok_or(Error::CategoriaNotFound { id })?;
        return Ok(Reply::ok(categoria).into_response());
    }
    Ok(Reply::ok(categoria::get_all_categorias(&state.db).await?).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CategoriaInput>,
) -> Result<Reply<CategoriaModel>> {
    let created = categoria::create_categoria(&state.db, &input).await?;
    Ok(Reply::created("Categoría creada exitosamente", created))
}

pub async fn update(
    State(state): State<AppState>,
    params: Params,
    JsonBody(input): JsonBody<CategoriaInput>,
) -> Result<Reply<CategoriaModel>> {
    let id = params.require_id()?;
    let updated = categoria::update_categoria(&state.db, id, &input).await?;
    Ok(Reply::with_message("Categoría actualizada exitosamente", updated))
}

pub async fn delete(State(state): State<AppState>, params: Params) -> Result<Reply<()>> {
    let id = params.require_id()?;
    categoria::delete_categoria(&state.db, id).await?;
    Ok(Reply::message("Categoría eliminada exitosamente"))
}
