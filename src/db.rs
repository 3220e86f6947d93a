use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Build the Postgres pool lazily — the first connection is made on first
/// use, so startup never blocks on the database.
pub fn build_pool(config: &AppConfig, url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_pool_max_connections)
        .min_connections(config.db_pool_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_pool_acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.db_pool_idle_timeout_seconds))
        .connect_lazy(url)
        .map_err(|error| AppError::Dependency(format!("Invalid DATABASE_URL: {error}")))
}
