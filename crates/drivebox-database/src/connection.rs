//! PostgreSQL connection pool setup.

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use drivebox_core::config::DatabaseConfig;
use drivebox_core::error::{AppError, ErrorKind};
use drivebox_core::result::AppResult;

/// Build and connect the shared connection pool.
pub async fn connect(config: &DatabaseConfig) -> AppResult<PgPool> {
    info!(
        url = %redact_url(&config.url),
        max_connections = config.max_connections,
        "Connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(&config.url)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to connect to database", e)
        })?;

    info!("PostgreSQL connection pool ready");
    Ok(pool)
}

/// Round-trip a trivial query to verify connectivity.
pub async fn health_check(pool: &PgPool) -> AppResult<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))?;
    Ok(())
}

/// Strip the credential section of a connection URL so it can be logged.
fn redact_url(url: &str) -> String {
    match (url.split_once("://"), url.rsplit_once('@')) {
        (Some((scheme, _)), Some((_, host))) => format!("{scheme}://****@{host}"),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url_hides_credentials() {
        assert_eq!(
            redact_url("postgres://drivebox:s3cret@db:5432/drivebox"),
            "postgres://****@db:5432/drivebox"
        );
    }

    #[test]
    fn test_redact_url_without_credentials_is_untouched() {
        assert_eq!(
            redact_url("postgres://localhost/drivebox"),
            "postgres://localhost/drivebox"
        );
    }
}
