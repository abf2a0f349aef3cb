//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shopkeep migrate
//! ```
//!
//! Applies `crates/storefront/migrations/` and creates the session store
//! table used by `tower-sessions`.

use tracing::info;

use shopkeep_storefront::db;

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running storefront migrations...");
    db::run_migrations(&pool).await?;

    info!("Storefront migrations complete!");
    Ok(())
}
