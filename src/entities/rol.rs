//! Account roles used for authorization decisions and session tokens.

// sea-orm derives generate undocumented items (RolEnum)
#![allow(missing_docs)]

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of an authenticated account.
///
/// Staff rows store `empleado` or `gerente`; loyalty customers are always
/// `cliente` and never stored in the staff table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    /// Regular staff member
    #[sea_orm(string_value = "empleado")]
    Empleado,
    /// Manager with access to administration screens
    #[sea_orm(string_value = "gerente")]
    Gerente,
    /// Loyalty-program customer
    #[sea_orm(string_value = "cliente")]
    Cliente,
}

impl Rol {
    /// Parses a staff role from request input. `cliente` is not a staff role.
    #[must_use]
    pub fn parse_staff(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "empleado" => Some(Self::Empleado),
            "gerente" => Some(Self::Gerente),
            _ => None,
        }
    }

    /// Stored and serialized name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empleado => "empleado",
            Self::Gerente => "gerente",
            Self::Cliente => "cliente",
        }
    }
}
