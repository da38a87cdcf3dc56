//! Cliente frecuente entity - A loyalty-program customer.
//!
//! Customers log in with either their email or their phone number, so both are
//! unique. `codigo_cliente` is the human-readable code printed on receipts.

// sea-orm derives generate undocumented items (Column, ActiveModel, Relation)
#![allow(missing_docs)]

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cliente frecuente database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clientes_frecuentes")]
pub struct Model {
    /// Unique identifier for the customer
    #[sea_orm(primary_key)]
    pub id_cliente: i32,
    /// Customer code, `CLI-` followed by six characters
    #[sea_orm(unique)]
    pub codigo_cliente: String,
    /// Full name
    pub nombre: String,
    /// Email, stored lower-case
    #[sea_orm(unique)]
    pub correo: String,
    /// Phone number, digits only
    #[sea_orm(unique)]
    pub telefono: String,
    /// bcrypt password hash
    #[serde(skip_serializing)]
    pub pass: String,
    /// Delivery address
    #[sea_orm(column_type = "Text")]
    pub direccion_entrega: String,
    /// Loyalty points balance
    pub bonos: i32,
    /// When the customer registered
    pub created_at: DateTime,
}

/// `ClienteFrecuente` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
