//! Supply (insumo) business logic.
//!
//! Reads always join the owning category so listings can show its name without
//! a second request. Stock is clamped at zero on every write.

use crate::{
    core::validation,
    entities::{Categoria, Insumo, categoria, insumo},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, SelectTwo, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Request fields for creating or replacing a supply.
///
/// `id_categoria` and `stock` accept numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsumoInput {
    /// Supply name
    pub nombre: Option<String>,
    /// Category id
    #[serde(default, deserialize_with = "validation::lenient_int")]
    pub id_categoria: Option<i64>,
    /// Units in stock; negative values are clamped to zero
    #[serde(default, deserialize_with = "validation::lenient_int")]
    pub stock: Option<i64>,
    /// Last order date, `YYYY-MM-DD`
    pub fecha_ultimo_pedido: Option<String>,
}

/// A supply together with the name and description of its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsumoConCategoria {
    /// Stored row
    #[serde(flatten)]
    pub insumo: insumo::Model,
    /// Name of the category
    pub categoria_nombre: String,
    /// Description of the category
    pub categoria_descripcion: Option<String>,
}

impl InsumoConCategoria {
    fn from_pair((insumo, categoria): (insumo::Model, Option<categoria::Model>)) -> Option<Self> {
        // Inner-join semantics: a row without its category is not listed.
        categoria.map(|c| Self {
            insumo,
            categoria_nombre: c.nombre,
            categoria_descripcion: c.descripcion,
        })
    }
}

struct ValidInsumo {
    nombre: String,
    id_categoria: i32,
    stock: i32,
    fecha_ultimo_pedido: Option<Date>,
}

/// Negative stock becomes 0; values beyond `i32::MAX` saturate.
fn clamp_stock(stock: Option<i64>) -> i32 {
    i32::try_from(stock.unwrap_or(0).max(0)).unwrap_or(i32::MAX)
}

async fn validate(db: &DatabaseConnection, input: &InsumoInput) -> Result<ValidInsumo> {
    let nombre = validation::required_text(input.nombre.as_deref(), "nombre", 1, 255)?;

    let id_categoria = input
        .id_categoria
        .filter(|id| *id > 0)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| Error::validation("La categoría es requerida"))?;
    if Categoria::find_by_id(id_categoria).one(db).await?.is_none() {
        return Err(Error::validation("La categoría especificada no existe"));
    }

    Ok(ValidInsumo {
        nombre,
        id_categoria,
        stock: clamp_stock(input.stock),
        fecha_ultimo_pedido: validation::optional_date(input.fecha_ultimo_pedido.as_deref())?,
    })
}

fn with_categoria() -> SelectTwo<Insumo, Categoria> {
    Insumo::find()
        .find_also_related(Categoria)
        .order_by_asc(insumo::Column::Nombre)
}

async fn collect(
    db: &DatabaseConnection,
    query: SelectTwo<Insumo, Categoria>,
) -> Result<Vec<InsumoConCategoria>> {
    Ok(query
        .all(db)
        .await?
        .into_iter()
        .filter_map(InsumoConCategoria::from_pair)
        .collect())
}

/// All supplies ordered by name.
pub async fn get_all_insumos(db: &DatabaseConnection) -> Result<Vec<InsumoConCategoria>> {
    collect(db, with_categoria()).await
}

/// Finds a supply by id, joined with its category.
pub async fn get_insumo_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<InsumoConCategoria>> {
    let row = Insumo::find_by_id(id)
        .find_also_related(Categoria)
        .one(db)
        .await?;
    Ok(row.and_then(InsumoConCategoria::from_pair))
}

/// Supplies of one category, ordered by name.
pub async fn get_insumos_by_categoria(
    db: &DatabaseConnection,
    id_categoria: i32,
) -> Result<Vec<InsumoConCategoria>> {
    collect(
        db,
        with_categoria().filter(insumo::Column::IdCategoria.eq(id_categoria)),
    )
    .await
}

/// Supplies whose name contains `term` (SQL `LIKE %term%`), ordered by name.
pub async fn search_insumos(db: &DatabaseConnection, term: &str) -> Result<Vec<InsumoConCategoria>> {
    debug!("Searching insumos for '{}'", term);
    collect(db, with_categoria().filter(insumo::Column::Nombre.contains(term))).await
}

/// Creates a supply.
///
/// # Errors
/// - `Validation` when the name is blank or too long, the category is missing or
///   unknown, or the date is not `YYYY-MM-DD`
pub async fn create_insumo(db: &DatabaseConnection, input: &InsumoInput) -> Result<insumo::Model> {
    let valid = validate(db, input).await?;

    let model = insumo::ActiveModel {
        id_categoria: Set(valid.id_categoria),
        nombre: Set(valid.nombre),
        stock: Set(valid.stock),
        fecha_ultimo_pedido: Set(valid.fecha_ultimo_pedido),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!(id = created.id_insumo, "Insumo created");
    Ok(created)
}

/// Replaces every editable field of a supply.
pub async fn update_insumo(
    db: &DatabaseConnection,
    id: i32,
    input: &InsumoInput,
) -> Result<insumo::Model> {
    let mut insumo: insumo::ActiveModel = Insumo::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::InsumoNotFound { id })?
        .into();

    let valid = validate(db, input).await?;

    insumo.id_categoria = Set(valid.id_categoria);
    insumo.nombre = Set(valid.nombre);
    insumo.stock = Set(valid.stock);
    insumo.fecha_ultimo_pedido = Set(valid.fecha_ultimo_pedido);
    insumo.update(db).await.map_err(Into::into)
}

/// Deletes a supply.
///
/// # Errors
/// Returns `Error::InsumoNotFound` when no row has this id.
pub async fn delete_insumo(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = Insumo::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::InsumoNotFound { id });
    }
    info!(id, "Insumo deleted");
    Ok(())
}
