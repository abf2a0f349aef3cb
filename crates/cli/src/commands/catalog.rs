//! Catalog inspection commands.

use tracing::info;

use shopkeep_storefront::db::{self, ProductRepository};

/// List every product in the catalog.
///
/// # Errors
///
/// Returns an error if the database connection or query fails.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let products = ProductRepository::new(&pool).list().await?;

    info!("Catalog ({} products)", products.len());
    for product in &products {
        info!(
            "  {:>4}  {:<14} {:>10}  {}",
            product.id.to_string(),
            product.sku.as_str(),
            product.price.to_string(),
            product.title
        );
    }

    Ok(())
}
