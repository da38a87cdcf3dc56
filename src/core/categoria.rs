//! Category business logic - CRUD over `categoria` with name uniqueness and a
//! delete guard.
//!
//! Names are compared case-insensitively so "Bebidas" and "bebidas" cannot both
//! exist. A category that still has supplies or products attached cannot be
//! deleted; the error reports how many of each are in the way.

use crate::{
    config::seed::CategoriaSeed,
    core::validation,
    entities::{Categoria, Insumo, Producto, categoria, insumo, producto},
    errors::{Error, Result, unique_violation},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{debug, info};

const DUPLICATE_NOMBRE: &str = "Ya existe una categoría con ese nombre";
const DUPLICATE_OTRO_NOMBRE: &str = "Ya existe otra categoría con ese nombre";

/// Request fields for creating or replacing a category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriaInput {
    /// Category name, unique ignoring case
    pub nombre: Option<String>,
    /// Optional description
    pub descripcion: Option<String>,
}

struct ValidCategoria {
    nombre: String,
    nombre_normalizado: String,
    descripcion: Option<String>,
}

/// Case-folded form of a category name used for uniqueness.
#[must_use]
pub fn normalize_nombre(nombre: &str) -> String {
    nombre.trim().to_lowercase()
}

fn validate(input: &CategoriaInput) -> Result<ValidCategoria> {
    let nombre = validation::required_text(input.nombre.as_deref(), "nombre", 2, 255)?;
    Ok(ValidCategoria {
        nombre_normalizado: normalize_nombre(&nombre),
        nombre,
        descripcion: validation::optional_text(input.descripcion.as_deref(), "descripcion", 1000)?,
    })
}

/// A unique-index violation on the normalized name becomes `Duplicate` with
/// `message`. Other database errors pass through.
fn map_unique_violation(err: DbErr, message: &str) -> Error {
    match unique_violation(&err) {
        Some(target) => {
            debug!("Unique index {} rejected categoria write", target);
            Error::duplicate(message)
        }
        None => err.into(),
    }
}

/// Retrieves all categories ordered alphabetically by name.
pub async fn get_all_categorias(db: &DatabaseConnection) -> Result<Vec<categoria::Model>> {
    Categoria::find()
        .order_by_asc(categoria::Column::Nombre)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by id.
pub async fn get_categoria_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<categoria::Model>> {
    Categoria::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a category whose name matches `nombre` ignoring case, optionally
/// skipping one id (the row being updated).
pub async fn find_by_nombre_ci<C>(
    db: &C,
    nombre: &str,
    exclude_id: Option<i32>,
) -> Result<Option<categoria::Model>>
where
    C: ConnectionTrait,
{
    let mut query =
        Categoria::find().filter(categoria::Column::NombreNormalizado.eq(normalize_nombre(nombre)));
    if let Some(id) = exclude_id {
        query = query.filter(categoria::Column::IdCategoria.ne(id));
    }
    query.one(db).await.map_err(Into::into)
}

/// Creates a category after validating the fields and checking the name is free.
///
/// # Errors
/// - `Validation` when the name is missing, shorter than 2 or longer than 255
///   characters, or the description exceeds 1000 characters
/// - `Duplicate` when another category has the same name ignoring case
pub async fn create_categoria(
    db: &DatabaseConnection,
    input: &CategoriaInput,
) -> Result<categoria::Model> {
    let valid = validate(input)?;

    if find_by_nombre_ci(db, &valid.nombre, None).await?.is_some() {
        return Err(Error::duplicate(DUPLICATE_NOMBRE));
    }

    let model = categoria::ActiveModel {
        nombre: Set(valid.nombre),
        nombre_normalizado: Set(valid.nombre_normalizado),
        descripcion: Set(valid.descripcion),
        ..Default::default()
    };
    let created = model
        .insert(db)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_NOMBRE))?;
    info!(id = created.id_categoria, "Categoria created");
    Ok(created)
}

/// Replaces name and description of an existing category.
pub async fn update_categoria(
    db: &DatabaseConnection,
    id: i32,
    input: &CategoriaInput,
) -> Result<categoria::Model> {
    let valid = validate(input)?;

    let mut categoria: categoria::ActiveModel = Categoria::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::CategoriaNotFound { id })?
        .into();

    if find_by_nombre_ci(db, &valid.nombre, Some(id)).await?.is_some() {
        return Err(Error::duplicate(DUPLICATE_OTRO_NOMBRE));
    }

    categoria.nombre = Set(valid.nombre);
    categoria.nombre_normalizado = Set(valid.nombre_normalizado);
    categoria.descripcion = Set(valid.descripcion);
    categoria
        .update(db)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_OTRO_NOMBRE))
}

/// Counts supplies and products that reference a category.
pub async fn count_dependents(db: &DatabaseConnection, id: i32) -> Result<(u64, u64)> {
    let insumos = Insumo::find()
        .filter(insumo::Column::IdCategoria.eq(id))
        .count(db)
        .await?;
    let productos = Producto::find()
        .filter(producto::Column::IdCategoria.eq(id))
        .count(db)
        .await?;
    Ok((insumos, productos))
}

/// Deletes a category that has no supplies or products attached.
///
/// # Errors
/// - `CategoriaNotFound` when the id does not exist
/// - `CategoriaInUse` with the dependent counts when anything references it
pub async fn delete_categoria(db: &DatabaseConnection, id: i32) -> Result<()> {
    if Categoria::find_by_id(id).one(db).await?.is_none() {
        return Err(Error::CategoriaNotFound { id });
    }

    let (insumos, productos) = count_dependents(db, id).await?;
    if insumos > 0 || productos > 0 {
        debug!(id, insumos, productos, "Refusing to delete referenced categoria");
        return Err(Error::CategoriaInUse { insumos, productos });
    }

    Categoria::delete_by_id(id).exec(db).await?;
    info!(id, "Categoria deleted");
    Ok(())
}

/// Creates the seed categories that do not exist yet. Returns how many were created.
pub async fn seed_categorias(db: &DatabaseConnection, seeds: &[CategoriaSeed]) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        if find_by_nombre_ci(db, seed.nombre.trim(), None).await?.is_some() {
            debug!("Seed categoria '{}' already exists", seed.nombre);
            continue;
        }
        let input = CategoriaInput {
            nombre: Some(seed.nombre.clone()),
            descripcion: seed.descripcion.clone(),
        };
        create_categoria(db, &input).await?;
        created += 1;
    }
    Ok(created)
}
