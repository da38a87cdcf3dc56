//! Staff (colaborador) business logic.
//!
//! Both staff surfaces share one validation path. The employee directory may
//! create staff without login credentials, the registration surface always
//! requires RFC, CURP and a password. RFC and CURP are encrypted with
//! [`FieldCipher`] and indexed by their blind index for uniqueness and lookup.

use crate::{
    core::{crypto::FieldCipher, password::PasswordHasher, validation},
    entities::{Colaborador, Rol, colaborador},
    errors::{Error, Result, unique_violation},
};
use sea_orm::{DbErr, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Request fields accepted by both staff surfaces.
///
/// The employee directory sends `email` and `cargo`; the registration surface
/// sends `correo` and `posicion`. Either spelling is accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColaboradorInput {
    /// First name
    pub nombre: Option<String>,
    /// Last name
    pub apellido: Option<String>,
    /// Registration spelling of the email
    pub correo: Option<String>,
    /// Directory spelling of `correo`
    pub email: Option<String>,
    /// Phone number
    pub telefono: Option<String>,
    /// Job title
    pub posicion: Option<String>,
    /// Directory spelling of `posicion`
    pub cargo: Option<String>,
    /// `empleado` or `gerente`; other values are rejected
    pub rol: Option<String>,
    /// Plain RFC; stored encrypted
    pub rfc: Option<String>,
    /// Plain CURP; stored encrypted
    pub curp: Option<String>,
    /// Plain password; hashed before it is stored
    pub contrasena: Option<String>,
}

impl ColaboradorInput {
    fn correo(&self) -> Option<&str> {
        non_blank(self.correo.as_deref()).or_else(|| non_blank(self.email.as_deref()))
    }

    fn posicion(&self) -> Option<&str> {
        non_blank(self.cargo.as_deref()).or_else(|| non_blank(self.posicion.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Whether login credentials (RFC, CURP, password) must accompany a new staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    /// All three or none (employee directory)
    Optional,
    /// All three (registration surface)
    Required,
}

struct BasicFields {
    nombre: String,
    apellido: String,
    correo: String,
    telefono: String,
    posicion: String,
    rol: Option<Rol>,
}

struct IdentityFields {
    rfc: String,
    curp: String,
}

fn validate_basic(input: &ColaboradorInput) -> Result<BasicFields> {
    let rol = match non_blank(input.rol.as_deref()) {
        Some(value) => Some(
            Rol::parse_staff(value)
                .ok_or_else(|| Error::validation("Rol inválido. Use 'empleado' o 'gerente'"))?,
        ),
        None => None,
    };

    Ok(BasicFields {
        nombre: validation::required_text(input.nombre.as_deref(), "nombre", 2, 100)?,
        apellido: validation::required_text(input.apellido.as_deref(), "apellido", 2, 100)?,
        posicion: validation::required_text(input.posicion(), "posicion", 1, 100)?,
        correo: validation::email(input.correo())?,
        telefono: validation::phone(input.telefono.as_deref())?,
        rol,
    })
}

fn validate_identity(input: &ColaboradorInput) -> Result<IdentityFields> {
    let (Some(rfc), Some(curp)) = (
        non_blank(input.rfc.as_deref()),
        non_blank(input.curp.as_deref()),
    ) else {
        return Err(Error::validation("RFC y CURP son requeridos"));
    };
    Ok(IdentityFields {
        rfc: validation::rfc(rfc)?,
        curp: validation::curp(curp)?,
    })
}

/// Validates RFC, CURP and password according to `policy`. Returns `None` when
/// credentials are optional and none were sent.
fn validate_credentials(
    input: &ColaboradorInput,
    policy: Credentials,
) -> Result<Option<(IdentityFields, String)>> {
    let has_rfc = non_blank(input.rfc.as_deref()).is_some();
    let has_curp = non_blank(input.curp.as_deref()).is_some();
    let contrasena = input.contrasena.as_deref().filter(|p| !p.is_empty());

    match policy {
        Credentials::Optional if !has_rfc && !has_curp && contrasena.is_none() => return Ok(None),
        Credentials::Optional if !(has_rfc && has_curp && contrasena.is_some()) => {
            return Err(Error::validation(
                "Si desea crear un usuario con credenciales, debe proporcionar RFC, CURP y contraseña",
            ));
        }
        _ => {}
    }

    let identity = validate_identity(input)?;
    let contrasena = contrasena.ok_or_else(|| Error::validation("La contraseña es requerida"))?;
    validation::password(contrasena)?;
    Ok(Some((identity, contrasena.to_string())))
}

/// Staff member as returned by the registration surface, with RFC and CURP decrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColaboradorDetalle {
    /// Stored row; RFC and CURP are replaced below
    #[serde(flatten)]
    pub colaborador: colaborador::Model,
    /// Decrypted RFC
    pub rfc: Option<String>,
    /// Decrypted CURP
    pub curp: Option<String>,
}

impl ColaboradorDetalle {
    /// Decrypts RFC and CURP; ciphertext that fails to decrypt is returned as stored.
    #[must_use]
    pub fn new(colaborador: colaborador::Model, cipher: &FieldCipher) -> Self {
        let rfc = colaborador.rfc.as_deref().map(|v| cipher.decrypt(v));
        let curp = colaborador.curp.as_deref().map(|v| cipher.decrypt(v));
        Self {
            colaborador,
            rfc,
            curp,
        }
    }
}

/// Turns a unique-index violation into the same duplicate error the explicit
/// checks produce. Other database errors pass through.
fn map_unique_violation(err: DbErr) -> Error {
    let Some(target) = unique_violation(&err) else {
        return err.into();
    };
    let message = if target.contains("rfc") {
        "El RFC ya está registrado"
    } else if target.contains("curp") {
        "El CURP ya está registrado"
    } else {
        "El correo electrónico ya está registrado"
    };
    debug!("Unique index {} rejected colaborador write", target);
    Error::duplicate(message)
}

/// Returns true when another row (other than `exclude_id`) has `column = value`.
async fn is_taken<C>(
    db: &C,
    column: colaborador::Column,
    value: &str,
    exclude_id: Option<i32>,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let mut query = Colaborador::find().filter(column.eq(value));
    if let Some(id) = exclude_id {
        query = query.filter(colaborador::Column::IdColaborador.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// All staff members ordered by name, then surname.
pub async fn get_all_colaboradores(db: &DatabaseConnection) -> Result<Vec<colaborador::Model>> {
    Colaborador::find()
        .order_by_asc(colaborador::Column::Nombre)
        .order_by_asc(colaborador::Column::Apellido)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a staff member by id.
pub async fn get_colaborador_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<colaborador::Model>> {
    Colaborador::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a staff member by email, ignoring case and surrounding blanks.
pub async fn get_colaborador_by_correo(
    db: &DatabaseConnection,
    correo: &str,
) -> Result<Option<colaborador::Model>> {
    Colaborador::find()
        .filter(colaborador::Column::Correo.eq(correo.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a staff member by RFC in any letter case, through the blind index.
pub async fn find_by_rfc(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    rfc: &str,
) -> Result<Option<colaborador::Model>> {
    Colaborador::find()
        .filter(colaborador::Column::RfcHash.eq(cipher.blind_index(rfc)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a staff member by CURP in any letter case, through the blind index.
pub async fn find_by_curp(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    curp: &str,
) -> Result<Option<colaborador::Model>> {
    Colaborador::find()
        .filter(colaborador::Column::CurpHash.eq(cipher.blind_index(curp)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a staff member.
///
/// Uniqueness of email, RFC and CURP is checked and the row inserted inside one
/// transaction; any failure rolls the transaction back.
///
/// # Errors
/// - `Validation` for any field rule, including the credentials `policy`
/// - `Duplicate` when the email, RFC or CURP is already registered
pub async fn create_colaborador(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    passwords: &PasswordHasher,
    input: &ColaboradorInput,
    policy: Credentials,
) -> Result<colaborador::Model> {
    let basic = validate_basic(input)?;
    let credentials = validate_credentials(input, policy)?;

    // Hash before opening the transaction; bcrypt is slow.
    let (identity, pass) = match credentials {
        Some((identity, contrasena)) => (Some(identity), Some(passwords.hash(&contrasena).await?)),
        None => (None, None),
    };
    let rfc_hash = identity.as_ref().map(|i| cipher.blind_index(&i.rfc));
    let curp_hash = identity.as_ref().map(|i| cipher.blind_index(&i.curp));

    let txn = db.begin().await?;

    if is_taken(&txn, colaborador::Column::Correo, &basic.correo, None).await? {
        return Err(Error::duplicate("El correo electrónico ya está registrado"));
    }
    if let Some(hash) = &rfc_hash {
        if is_taken(&txn, colaborador::Column::RfcHash, hash, None).await? {
            return Err(Error::duplicate("El RFC ya está registrado"));
        }
    }
    if let Some(hash) = &curp_hash {
        if is_taken(&txn, colaborador::Column::CurpHash, hash, None).await? {
            return Err(Error::duplicate("El CURP ya está registrado"));
        }
    }

    let now = chrono::Utc::now().naive_utc();
    let model = colaborador::ActiveModel {
        nombre: Set(basic.nombre),
        apellido: Set(basic.apellido),
        correo: Set(basic.correo),
        telefono: Set(basic.telefono),
        posicion: Set(basic.posicion),
        rol: Set(basic.rol.unwrap_or(Rol::Empleado)),
        rfc: Set(identity.as_ref().map(|i| cipher.encrypt_rfc(&i.rfc))),
        rfc_hash: Set(rfc_hash),
        curp: Set(identity.as_ref().map(|i| cipher.encrypt_curp(&i.curp))),
        curp_hash: Set(curp_hash),
        pass: Set(pass),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = model.insert(&txn).await.map_err(map_unique_violation)?;
    txn.commit().await?;

    info!(
        id = created.id_colaborador,
        rol = created.rol.as_str(),
        "Colaborador created"
    );
    Ok(created)
}

/// Replaces the basic fields (name, surname, email, phone, position) of a staff
/// member. The role changes only when the request carries one.
///
/// # Errors
/// - `ColaboradorNotFound` when the id does not exist
/// - `Duplicate` when another staff member already uses the email
pub async fn update_colaborador(
    db: &DatabaseConnection,
    id: i32,
    input: &ColaboradorInput,
) -> Result<colaborador::Model> {
    let basic = validate_basic(input)?;

    let mut colaborador: colaborador::ActiveModel = Colaborador::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::ColaboradorNotFound { id })?
        .into();

    if is_taken(db, colaborador::Column::Correo, &basic.correo, Some(id)).await? {
        return Err(Error::duplicate("Ya existe otro colaborador con ese email"));
    }

    colaborador.nombre = Set(basic.nombre);
    colaborador.apellido = Set(basic.apellido);
    colaborador.correo = Set(basic.correo);
    colaborador.telefono = Set(basic.telefono);
    colaborador.posicion = Set(basic.posicion);
    if let Some(rol) = basic.rol {
        colaborador.rol = Set(rol);
    }
    colaborador.updated_at = Set(chrono::Utc::now().naive_utc());
    colaborador
        .update(db)
        .await
        .map_err(map_unique_violation)
}

/// Replaces basic fields plus RFC and CURP. The password is replaced only when
/// `contrasena` is non-empty.
///
/// # Errors
/// - `ColaboradorNotFound` when the id does not exist
/// - `Duplicate` when the email, RFC or CURP belongs to another staff member
pub async fn update_colaborador_registro(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    passwords: &PasswordHasher,
    id: i32,
    input: &ColaboradorInput,
) -> Result<colaborador::Model> {
    let basic = validate_basic(input)?;
    let identity = validate_identity(input)?;
    let pass = match input.contrasena.as_deref().filter(|p| !p.is_empty()) {
        Some(contrasena) => {
            validation::password(contrasena)?;
            Some(passwords.hash(contrasena).await?)
        }
        None => None,
    };
    let rfc_hash = cipher.blind_index(&identity.rfc);
    let curp_hash = cipher.blind_index(&identity.curp);

    let txn = db.begin().await?;

    let mut colaborador: colaborador::ActiveModel = Colaborador::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(Error::ColaboradorNotFound { id })?
        .into();

    if is_taken(&txn, colaborador::Column::Correo, &basic.correo, Some(id)).await? {
        return Err(Error::duplicate("El correo electrónico ya está en uso"));
    }
    if is_taken(&txn, colaborador::Column::RfcHash, &rfc_hash, Some(id)).await? {
        return Err(Error::duplicate("El RFC ya está en uso"));
    }
    if is_taken(&txn, colaborador::Column::CurpHash, &curp_hash, Some(id)).await? {
        return Err(Error::duplicate("El CURP ya está en uso"));
    }

    colaborador.nombre = Set(basic.nombre);
    colaborador.apellido = Set(basic.apellido);
    colaborador.correo = Set(basic.correo);
    colaborador.telefono = Set(basic.telefono);
    colaborador.posicion = Set(basic.posicion);
    if let Some(rol) = basic.rol {
        colaborador.rol = Set(rol);
    }
    colaborador.rfc = Set(Some(cipher.encrypt_rfc(&identity.rfc)));
    colaborador.rfc_hash = Set(Some(rfc_hash));
    colaborador.curp = Set(Some(cipher.encrypt_curp(&identity.curp)));
    colaborador.curp_hash = Set(Some(curp_hash));
    if pass.is_some() {
        colaborador.pass = Set(pass);
    }
    colaborador.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = colaborador
        .update(&txn)
        .await
        .map_err(map_unique_violation)?;
    txn.commit().await?;
    Ok(updated)
}

/// Deletes a staff member.
///
/// # Errors
/// Returns `Error::ColaboradorNotFound` when no row has this id.
pub async fn delete_colaborador(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = Colaborador::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        warn!(id, "Delete requested for unknown colaborador");
        return Err(Error::ColaboradorNotFound { id });
    }
    info!(id, "Colaborador deleted");
    Ok(())
}
