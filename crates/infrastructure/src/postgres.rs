use std::env;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use permitra_core::{AppError, AppResult};

/// Environment-driven configuration for the PostgreSQL store.
#[derive(Debug, Clone)]
pub struct PostgresStoreConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Maximum pool connections.
    pub max_connections: u32,
}

impl PostgresStoreConfig {
    /// Loads configuration from the environment, honoring a local `.env`.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").map_err(|_| {
            AppError::Validation("missing required environment variable DATABASE_URL".to_owned())
        })?;
        let max_connections = env::var("ASSIGNMENT_STORE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(10);

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

/// Connects to the assignment store and applies pending migrations.
pub async fn connect_and_migrate(config: &PostgresStoreConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    tracing::info!("assignment store migrations applied");
    Ok(pool)
}
