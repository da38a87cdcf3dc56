//! Staff login and session payloads.

use crate::{
    core::{
        colaborador,
        crypto::FieldCipher,
        password::PasswordHasher,
        token::{Subject, TokenIssuer},
        validation,
    },
    entities::{ColaboradorModel, Rol},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Token plus the profile of whoever logged in.
#[derive(Debug, Clone, Serialize)]
pub struct Sesion<U> {
    /// Signed session token
    pub token: String,
    /// Profile of the account
    pub usuario: U,
}

/// Staff login request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    /// Login email
    pub correo: Option<String>,
    /// Plain password
    pub contrasena: Option<String>,
}

/// Staff profile returned after login. RFC and CURP are masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsuarioColaborador {
    /// Row id
    pub id_colaborador: i32,
    /// First name
    pub nombre: String,
    /// Last name
    pub apellido: String,
    /// Login email
    pub correo: String,
    /// Masked RFC, see [`mask_rfc`]
    pub rfc: String,
    /// Masked CURP, see [`mask_curp`]
    pub curp: String,
    /// Phone number
    pub telefono: String,
    /// Job title
    pub posicion: String,
    /// Role used for authorization
    pub rol: Rol,
}

fn mask(value: &str, keep_end: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 4 + keep_end {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - keep_end..].iter().collect();
    format!("{head}****{tail}")
}

/// First 4 characters, `****`, last 3.
#[must_use]
pub fn mask_rfc(rfc: &str) -> String {
    mask(rfc, 3)
}

/// First 4 characters, `****`, last 4.
#[must_use]
pub fn mask_curp(curp: &str) -> String {
    mask(curp, 4)
}

impl UsuarioColaborador {
    fn new(colaborador: ColaboradorModel, cipher: &FieldCipher) -> Self {
        let reveal = |value: Option<&str>| value.map(|v| cipher.decrypt(v)).unwrap_or_default();
        let rfc = mask_rfc(&reveal(colaborador.rfc.as_deref()));
        let curp = mask_curp(&reveal(colaborador.curp.as_deref()));
        Self {
            id_colaborador: colaborador.id_colaborador,
            nombre: colaborador.nombre,
            apellido: colaborador.apellido,
            correo: colaborador.correo,
            rfc,
            curp,
            telefono: colaborador.telefono,
            posicion: colaborador.posicion,
            rol: colaborador.rol,
        }
    }
}

/// Authenticates a staff member by email and password.
///
/// Unknown email, an account without a password and a wrong password all fail
/// with the same `InvalidCredentials` error.
pub async fn login_colaborador(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    passwords: &PasswordHasher,
    tokens: &TokenIssuer,
    input: &LoginInput,
) -> Result<Sesion<UsuarioColaborador>> {
    let correo = input.correo.as_deref().map(str::trim).unwrap_or_default();
    let contrasena = input.contrasena.as_deref().unwrap_or_default();
    if correo.is_empty() || contrasena.is_empty() {
        return Err(Error::validation("Correo y contraseña son requeridos"));
    }
    if !validation::is_valid_email(correo) {
        return Err(Error::validation("Correo electrónico inválido"));
    }

    let Some(colaborador) = colaborador::get_colaborador_by_correo(db, correo).await? else {
        warn!("Staff login failed: unknown email");
        return Err(Error::InvalidCredentials);
    };
    let verified = match colaborador.pass.as_deref() {
        Some(hash) => passwords.verify(contrasena, hash).await?,
        None => false,
    };
    if !verified {
        warn!(id = colaborador.id_colaborador, "Staff login failed");
        return Err(Error::InvalidCredentials);
    }

    let token = tokens.issue(&Subject {
        id: colaborador.id_colaborador,
        rol: colaborador.rol,
        correo: colaborador.correo.clone(),
        codigo_cliente: None,
    })?;
    info!(id = colaborador.id_colaborador, "Staff logged in");
    Ok(Sesion {
        token,
        usuario: UsuarioColaborador::new(colaborador, cipher),
    })
}
