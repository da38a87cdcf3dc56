use ap_restaurante::{
    api::{self, AppState},
    config::{self, database},
    core::categoria,
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection(&app_config.database)
        .await
        .inspect_err(|e| error!("Failed to connect to the database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed categories from config.toml (existing names are left alone)
    categoria::seed_categorias(&db, &app_config.seed.categorias)
        .await
        .inspect(|count| info!("Seeded {} new categories.", count))
        .inspect_err(|e| error!("Failed to seed categories: {}", e))?;

    // 6. Serve until shutdown
    let state = AppState::new(db, &app_config.security)?;
    api::serve(state, &app_config.server).await
}
