//! Producto entity - A menu item. Only read here to protect categories that
//! still have products attached.

// sea-orm derives generate undocumented items (Column, ActiveModel, Relation)
#![allow(missing_docs)]

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Producto database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "productos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id_producto: i32,
    pub id_categoria: i32,
    pub nombre: String,
    pub precio: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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
