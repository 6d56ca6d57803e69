//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront-cli migrate
//! ```
//!
//! Applies the SQL migrations in `crates/storefront/migrations/` (embedded
//! at compile time) and then creates the session store table.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, connect};

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing, the connection
/// fails or a migration cannot be applied.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool.clone()).migrate().await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
