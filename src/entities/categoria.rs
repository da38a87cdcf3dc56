//! Categoria entity - Groups supplies (insumos) and menu products.
//!
//! Names are unique ignoring case. `nombre_normalizado` holds the name
//! lower-cased in Rust and carries the unique index, so the rule holds on
//! backends whose `LOWER()` folds only ASCII.

// sea-orm derives generate undocumented items (Column, ActiveModel, Relation)
#![allow(missing_docs)]

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Categoria database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categoria")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id_categoria: i32,
    /// Display name (e.g., "Lácteos", "Bebidas")
    pub nombre: String,
    /// `nombre` lower-cased; unique
    #[sea_orm(unique)]
    #[serde(skip)]
    pub nombre_normalizado: String,
    /// Optional free-text description
    #[sea_orm(column_type = "Text", nullable)]
    pub descripcion: Option<String>,
}

/// Defines relationships between Categoria and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many supplies
    #[sea_orm(has_many = "super::insumo::Entity")]
    Insumos,
    /// One category has many products
    #[sea_orm(has_many = "super::producto::Entity")]
    Productos,
}

impl Related<super::insumo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Insumos.def()
    }
}

impl Related<super::producto::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Productos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
