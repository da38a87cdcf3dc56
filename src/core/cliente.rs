//! Loyalty-program customers: registration, customer codes and login.
//!
//! Customers log in with either their email or their phone number. Phones are
//! stored as digits only, so `(55) 1234-5678` and `5512345678` are the same
//! account.

use crate::{
    core::{
        auth::Sesion,
        password::PasswordHasher,
        token::{Subject, TokenIssuer},
        validation,
    },
    entities::{ClienteFrecuente, Rol, cliente_frecuente},
    errors::{Error, Result, unique_violation},
};
use rand::Rng;
use sea_orm::{DbErr, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Alphabet for customer codes; omits 0, O, 1 and I.
pub const CODIGO_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Every customer code starts with this prefix.
pub const CODIGO_PREFIX: &str = "CLI-";
const CODIGO_SUFFIX_LEN: usize = 6;
const MAX_CODIGO_ATTEMPTS: usize = 50;

/// Request fields for loyalty registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistroClienteInput {
    /// Full name
    pub nombre: Option<String>,
    /// Login email
    pub correo: Option<String>,
    /// Phone number, any format
    pub telefono: Option<String>,
    /// Delivery address
    pub direccion_entrega: Option<String>,
    /// Plain password; hashed before it is stored
    pub contrasena: Option<String>,
}

/// `correo_o_telefono` is preferred; `correo` is accepted for older clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginClienteInput {
    /// Email, or a phone number in any format
    pub correo_o_telefono: Option<String>,
    /// Older spelling of `correo_o_telefono`
    pub correo: Option<String>,
    /// Plain password
    pub contrasena: Option<String>,
}

/// Customer profile returned after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsuarioCliente {
    /// Row id
    pub id_cliente: i32,
    /// `CLI-XXXXXX` code
    pub codigo_cliente: String,
    /// Full name
    pub nombre: String,
    /// Login email
    pub correo: String,
    /// Phone digits
    pub telefono: String,
    /// Delivery address
    pub direccion_entrega: String,
    /// Loyalty points
    pub bonos: i32,
    /// Always `cliente`
    pub tipo: &'static str,
}

impl From<cliente_frecuente::Model> for UsuarioCliente {
    fn from(cliente: cliente_frecuente::Model) -> Self {
        Self {
            id_cliente: cliente.id_cliente,
            codigo_cliente: cliente.codigo_cliente,
            nombre: cliente.nombre,
            correo: cliente.correo,
            telefono: cliente.telefono,
            direccion_entrega: cliente.direccion_entrega,
            bonos: cliente.bonos,
            tipo: "cliente",
        }
    }
}

/// A random `CLI-XXXXXX` code. Uniqueness is not checked here.
#[must_use]
pub fn random_codigo_cliente() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODIGO_SUFFIX_LEN)
        .map(|_| char::from(CODIGO_ALPHABET[rng.gen_range(0..CODIGO_ALPHABET.len())]))
        .collect();
    format!("{CODIGO_PREFIX}{suffix}")
}

/// Draws codes from `candidate` until one is unused, giving up after 50 tries.
pub async fn generate_codigo_cliente<F>(db: &DatabaseConnection, mut candidate: F) -> Result<String>
where
    F: FnMut() -> String,
{
    for _ in 0..MAX_CODIGO_ATTEMPTS {
        let codigo = candidate();
        let taken = ClienteFrecuente::find()
            .filter(cliente_frecuente::Column::CodigoCliente.eq(codigo.as_str()))
            .count(db)
            .await?
            > 0;
        if !taken {
            return Ok(codigo);
        }
    }
    warn!("No free customer code after {} attempts", MAX_CODIGO_ATTEMPTS);
    Err(Error::CodigoClienteExhausted)
}

fn map_unique_violation(err: DbErr) -> Error {
    let Some(target) = unique_violation(&err) else {
        return err.into();
    };
    if target.contains("telefono") {
        Error::duplicate("El número de teléfono ya está registrado.")
    } else if target.contains("correo") {
        Error::duplicate("El correo electrónico ya está registrado.")
    } else {
        Error::CodigoClienteExhausted
    }
}

/// Registers a loyalty customer with zero `bonos` and a fresh customer code.
///
/// # Errors
/// - `Validation` when a field is missing, the email is invalid, the phone does
///   not have 10 to 15 digits, or the password is shorter than 8 characters
/// - `Duplicate` when the email or phone is already registered
/// - `CodigoClienteExhausted` when no free code was found
pub async fn register_cliente(
    db: &DatabaseConnection,
    passwords: &PasswordHasher,
    input: &RegistroClienteInput,
) -> Result<cliente_frecuente::Model> {
    let nombre = input.nombre.as_deref().map(str::trim).unwrap_or_default();
    let correo = input.correo.as_deref().map(str::trim).unwrap_or_default();
    let telefono = validation::digits_only(input.telefono.as_deref().unwrap_or_default());
    let direccion = input
        .direccion_entrega
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let contrasena = input.contrasena.as_deref().unwrap_or_default();

    if [nombre, correo, telefono.as_str(), direccion, contrasena]
        .iter()
        .any(|v| v.is_empty())
    {
        return Err(Error::validation(
            "Todos los campos son obligatorios: nombre, correo, teléfono, dirección de entrega y contraseña.",
        ));
    }
    if !validation::is_valid_email(correo) {
        return Err(Error::validation("Correo electrónico inválido."));
    }
    if !validation::is_valid_phone(&telefono) {
        return Err(Error::validation(
            "El teléfono debe tener entre 10 y 15 dígitos.",
        ));
    }
    validation::password(contrasena)?;

    let correo = correo.to_lowercase();
    let correo_taken = ClienteFrecuente::find()
        .filter(cliente_frecuente::Column::Correo.eq(correo.as_str()))
        .count(db)
        .await?
        > 0;
    if correo_taken {
        return Err(Error::duplicate("El correo electrónico ya está registrado."));
    }
    let telefono_taken = ClienteFrecuente::find()
        .filter(cliente_frecuente::Column::Telefono.eq(telefono.as_str()))
        .count(db)
        .await?
        > 0;
    if telefono_taken {
        return Err(Error::duplicate(
            "El número de teléfono ya está registrado.",
        ));
    }

    let pass = passwords.hash(contrasena).await?;
    let codigo = generate_codigo_cliente(db, random_codigo_cliente).await?;

    let model = cliente_frecuente::ActiveModel {
        codigo_cliente: Set(codigo),
        nombre: Set(nombre.to_string()),
        correo: Set(correo),
        telefono: Set(telefono),
        pass: Set(pass),
        direccion_entrega: Set(direccion.to_string()),
        bonos: Set(0),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    let created = model.insert(db).await.map_err(map_unique_violation)?;
    info!(
        id = created.id_cliente,
        codigo = %created.codigo_cliente,
        "Cliente frecuente registered"
    );
    Ok(created)
}

/// How a login identifier is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identificador {
    /// Lower-cased email
    Correo(String),
    /// Digits only
    Telefono(String),
}

/// An identifier is an email when it looks like one; otherwise its digits must
/// number at least 10 to be treated as a phone.
pub fn parse_identificador(value: &str) -> Result<Identificador> {
    let value = value.trim();
    if validation::is_valid_email(value) {
        return Ok(Identificador::Correo(value.to_lowercase()));
    }
    let digits = validation::digits_only(value);
    if digits.len() < 10 {
        return Err(Error::validation(
            "Ingresa un correo electrónico válido o un número de teléfono de al menos 10 dígitos.",
        ));
    }
    Ok(Identificador::Telefono(digits))
}

/// Authenticates a customer by email or phone and issues a session token.
///
/// Unknown accounts and wrong passwords fail identically with
/// `InvalidClientCredentials`.
pub async fn login_cliente(
    db: &DatabaseConnection,
    passwords: &PasswordHasher,
    tokens: &TokenIssuer,
    input: &LoginClienteInput,
) -> Result<Sesion<UsuarioCliente>> {
    let identificador = input
        .correo_o_telefono
        .as_deref()
        .or(input.correo.as_deref())
        .map(str::trim)
        .unwrap_or_default();
    let contrasena = input.contrasena.as_deref().unwrap_or_default();
    if identificador.is_empty() || contrasena.is_empty() {
        return Err(Error::validation(
            "Correo/teléfono y contraseña son requeridos.",
        ));
    }

    let query = match parse_identificador(identificador)? {
        Identificador::Correo(correo) => {
            ClienteFrecuente::find().filter(cliente_frecuente::Column::Correo.eq(correo))
        }
        Identificador::Telefono(telefono) => {
            ClienteFrecuente::find().filter(cliente_frecuente::Column::Telefono.eq(telefono))
        }
    };
    let Some(cliente) = query.one(db).await? else {
        warn!("Cliente login failed: unknown account");
        return Err(Error::InvalidClientCredentials);
    };
    if !passwords.verify(contrasena, &cliente.pass).await? {
        warn!(id = cliente.id_cliente, "Cliente login failed: wrong password");
        return Err(Error::InvalidClientCredentials);
    }

    let token = tokens.issue(&Subject {
        id: cliente.id_cliente,
        rol: Rol::Cliente,
        correo: cliente.correo.clone(),
        codigo_cliente: Some(cliente.codigo_cliente.clone()),
    })?;
    info!(id = cliente.id_cliente, "Cliente logged in");
    Ok(Sesion {
        token,
        usuario: cliente.into(),
    })
}
