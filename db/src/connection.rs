use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DbConfig;
use crate::error::DbError;

/// Builds the process-wide connection pool.
///
/// Called once at startup; the returned pool is cloned into the gateway and
/// shared by every request. Connects eagerly so a bad configuration fails the
/// boot instead of the first request.
pub async fn connect(config: &DbConfig<'_>) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(config.connect_options())
        .await?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        max_connections = config.max_connections,
        "Database pool ready"
    );

    Ok(pool)
}
