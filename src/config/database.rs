//! Database settings, connection and table creation.
//!
//! `DATABASE_URL` wins when set (SQLite for local development and tests).
//! Otherwise sqlx MySQL connect options are built from `DB_HOST`, `DB_USER`,
//! `DB_PASS`, `DB_NAME` and `DB_CHARSET`, so credentials are never spliced
//! into a URL. Tables are generated from the entity definitions
//! with `Schema::create_table_from_entity`, parents before children.

use crate::entities::{Categoria, ClienteFrecuente, Colaborador, Insumo, Producto};
use crate::errors::{Error, Result};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, RuntimeErr, Schema,
    SqlxMySqlConnector,
    sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions},
};
use tracing::{info, instrument};

/// Where to connect. Credentials never appear in `Debug` output.
#[derive(Clone)]
pub enum DatabaseSettings {
    /// A complete connection URL from `DATABASE_URL`
    Url(String),
    /// MySQL assembled from the `DB_*` variables
    MySql(MySqlSettings),
}

/// MySQL connection parts
#[derive(Clone)]
pub struct MySqlSettings {
    /// Server host name
    pub host: String,
    /// Login user
    pub user: String,
    /// Login password, empty when unset
    pub password: String,
    /// Schema name
    pub database: String,
    /// Connection character set
    pub charset: String,
}

impl MySqlSettings {
    /// sqlx connect options; nothing is spliced into a URL.
    #[must_use]
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .username(&self.user)
            .database(&self.database)
            .charset(&self.charset);
        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }
}

impl std::fmt::Debug for MySqlSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSettings")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("charset", &self.charset)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f
                .debug_struct("Url")
                .field("backend", &url.split(':').next().unwrap_or_default())
                .finish_non_exhaustive(),
            Self::MySql(settings) => std::fmt::Debug::fmt(settings, f),
        }
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config {
            message: format!("Missing required environment variable {key}"),
        })
}

impl DatabaseSettings {
    /// Reads settings through `lookup` (normally `std::env::var`).
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first missing `DB_*` variable when
    /// `DATABASE_URL` is not set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            return Ok(Self::Url(url));
        }

        Ok(Self::MySql(MySqlSettings {
            host: required(&lookup, "DB_HOST")?,
            user: required(&lookup, "DB_USER")?,
            database: required(&lookup, "DB_NAME")?,
            charset: required(&lookup, "DB_CHARSET")?,
            password: lookup("DB_PASS").unwrap_or_default(),
        }))
    }
}

/// Opens the connection pool shared by every request.
#[instrument(skip_all)]
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    let db = match settings {
        DatabaseSettings::Url(url) => Database::connect(url.as_str()).await?,
        DatabaseSettings::MySql(mysql) => {
            let pool = MySqlPoolOptions::new()
                .connect_with(mysql.connect_options())
                .await
                .map_err(|e| DbErr::Conn(RuntimeErr::SqlxError(e)))?;
            SqlxMySqlConnector::from_sqlx_mysql_pool(pool)
        }
    };
    info!(backend = ?db.get_database_backend(), "Database connection established");
    Ok(db)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table that does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    // Parents first so foreign keys resolve
    create_table(db, &schema, Categoria).await?;
    create_table(db, &schema, Insumo).await?;
    create_table(db, &schema, Producto).await?;
    create_table(db, &schema, Colaborador).await?;
    create_table(db, &schema, ClienteFrecuente).await?;

    Ok(())
}
