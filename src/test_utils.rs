//! Shared test utilities.
//!
//! Helpers for an in-memory database and for creating rows with sensible
//! defaults. Security primitives use fixed secrets and the cheapest bcrypt cost.

use crate::{
    api::AppState,
    core::{
        categoria::{self, CategoriaInput},
        colaborador::{self, ColaboradorInput, Credentials},
        crypto::FieldCipher,
        insumo::{self, InsumoInput},
        password::PasswordHasher,
        token::TokenIssuer,
    },
    entities,
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;

/// Field encryption key
pub const TEST_ENCRYPTION_KEY: &str = "clave-de-pruebas";
/// Token signing secret
pub const TEST_TOKEN_SECRET: &str = "firma-de-pruebas";
/// Password that passes validation
pub const TEST_PASSWORD: &str = "secreto123";
/// Well-formed RFC
pub const TEST_RFC: &str = "ABCD123456XY1";
/// Well-formed CURP
pub const TEST_CURP: &str = "GODE561231HDFRRN09";

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Cipher over [`TEST_ENCRYPTION_KEY`].
#[allow(clippy::unwrap_used)]
pub fn test_cipher() -> FieldCipher {
    FieldCipher::new(TEST_ENCRYPTION_KEY).unwrap()
}

/// bcrypt at cost 4 keeps tests fast.
pub const fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(4)
}

/// Token issuer over [`TEST_TOKEN_SECRET`] with a one-hour lifetime.
#[allow(clippy::unwrap_used)]
pub fn test_tokens() -> TokenIssuer {
    TokenIssuer::new(TEST_TOKEN_SECRET, 3600).unwrap()
}

/// Handler state over `db` with the test security primitives.
pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState {
        db,
        cipher: Arc::new(test_cipher()),
        passwords: test_hasher(),
        tokens: Arc::new(test_tokens()),
    }
}

/// Creates a category with no description.
pub async fn create_test_categoria(
    db: &DatabaseConnection,
    nombre: &str,
) -> Result<entities::categoria::Model> {
    categoria::create_categoria(
        db,
        &CategoriaInput {
            nombre: Some(nombre.to_string()),
            descripcion: None,
        },
    )
    .await
}

/// Creates a supply with no order date.
pub async fn create_test_insumo(
    db: &DatabaseConnection,
    nombre: &str,
    id_categoria: i32,
    stock: i64,
) -> Result<entities::insumo::Model> {
    insumo::create_insumo(
        db,
        &InsumoInput {
            nombre: Some(nombre.to_string()),
            id_categoria: Some(i64::from(id_categoria)),
            stock: Some(stock),
            fecha_ultimo_pedido: None,
        },
    )
    .await
}

/// Inserts a product directly; products have no business module.
///
/// # Defaults
/// * precio: 50.0
pub async fn create_test_producto(
    db: &DatabaseConnection,
    nombre: &str,
    id_categoria: i32,
) -> Result<entities::producto::Model> {
    let model = entities::producto::ActiveModel {
        id_categoria: Set(id_categoria),
        nombre: Set(nombre.to_string()),
        precio: Set(50.0),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Input for a staff member with full credentials.
///
/// # Defaults
/// * RFC: [`TEST_RFC`], CURP: [`TEST_CURP`], password: [`TEST_PASSWORD`]
pub fn colaborador_input(correo: &str) -> ColaboradorInput {
    ColaboradorInput {
        nombre: Some("Luis".to_string()),
        apellido: Some("Pérez".to_string()),
        correo: Some(correo.to_string()),
        telefono: Some("5598765432".to_string()),
        posicion: Some("Mesero".to_string()),
        rfc: Some(TEST_RFC.to_string()),
        curp: Some(TEST_CURP.to_string()),
        contrasena: Some(TEST_PASSWORD.to_string()),
        ..Default::default()
    }
}

/// Creates a staff member with full credentials (see [`colaborador_input`]).
pub async fn create_test_colaborador(
    db: &DatabaseConnection,
    cipher: &FieldCipher,
    passwords: &PasswordHasher,
    correo: &str,
) -> Result<entities::colaborador::Model> {
    colaborador::create_colaborador(
        db,
        cipher,
        passwords,
        &colaborador_input(correo),
        Credentials::Required,
    )
    .await
}
