//! Colaborador entity - A staff member.
//!
//! RFC and CURP are stored as AES ciphertext next to an HMAC blind index
//! (`rfc_hash`, `curp_hash`) used for uniqueness checks and lookups. `pass` holds
//! a bcrypt hash and is `None` for staff created without login credentials.

// sea-orm derives generate undocumented items (Column, ActiveModel, Relation)
#![allow(missing_docs)]

use super::rol::Rol;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Colaborador database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "colaboradores")]
pub struct Model {
    /// Unique identifier for the staff member
    #[sea_orm(primary_key)]
    pub id_colaborador: i32,
    /// First name(s)
    pub nombre: String,
    /// Last name(s)
    pub apellido: String,
    /// Login email, stored lower-case
    #[sea_orm(unique)]
    pub correo: String,
    /// Phone number, digits only
    pub telefono: String,
    /// Free-text job title (e.g., "Cocinero", "Gerente de turno")
    pub posicion: String,
    /// Authorization role, independent of `posicion`
    pub rol: Rol,
    /// Encrypted RFC
    #[serde(skip_serializing)]
    pub rfc: Option<String>,
    /// Blind index of the normalized RFC
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub rfc_hash: Option<String>,
    /// Encrypted CURP
    #[serde(skip_serializing)]
    pub curp: Option<String>,
    /// Blind index of the normalized CURP
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub curp_hash: Option<String>,
    /// bcrypt password hash
    #[serde(skip_serializing)]
    pub pass: Option<String>,
    /// When the row was created
    pub created_at: DateTime,
    /// When the row was last modified
    pub updated_at: DateTime,
}

/// `Colaborador` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
