//! Embedded schema migrations.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use drivebox_core::error::{AppError, ErrorKind};
use drivebox_core::result::AppResult;

/// All schema migrations, compiled into the binary.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply any migrations the database has not seen yet.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to run migrations", e)
    })?;
    info!(
        known_migrations = MIGRATOR.migrations.len(),
        "Schema migrations applied"
    );
    Ok(())
}
