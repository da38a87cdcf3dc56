//! Insumo entity - A kitchen supply tracked by stock count.

// sea-orm derives generate undocumented items (Column, ActiveModel, Relation)
#![allow(missing_docs)]

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Insumo database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "insumo")]
pub struct Model {
    /// Unique identifier for the supply
    #[sea_orm(primary_key)]
    pub id_insumo: i32,
    /// Category this supply belongs to
    pub id_categoria: i32,
    /// Supply name (e.g., "Harina", "Aceite de oliva")
    pub nombre: String,
    /// Units on hand, never negative
    pub stock: i32,
    /// Date of the last purchase order, if any
    pub fecha_ultimo_pedido: Option<Date>,
}

/// Defines relationships between Insumo and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each supply belongs to one category
    #[sea_orm(
        belongs_to = "super::categoria::Entity",
        from = "Column::IdCategoria",
        to = "super::categoria::Column::IdCategoria"
    )]
    Categoria,
}

impl Related<super::categoria::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categoria.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
