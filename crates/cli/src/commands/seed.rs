//! Seed the product catalog.
//!
//! Seeds the built-in demo catalog, the fixed test catalog, or a YAML file
//! holding a list of products:
//!
//! ```yaml
//! - title: iPhone 16
//!   sku: PHONE-X-001
//!   price: "999.99"
//!   images: [iphone-green.avif]
//!   description: Latest iPhone with advanced camera system
//! ```
//!
//! The catalog is validated before connecting to the database. Products
//! whose SKU already exists are skipped, so seeding is repeatable.

use std::path::Path;

use tracing::{error, info};

use shopkeep_core::{NewProduct, ProductError, demo_catalog, test_catalog, validate_catalog};
use shopkeep_storefront::db::{self, ProductRepository};

/// Which catalog to seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The built-in demo products.
    Demo,
    /// `TEST-001` to `TEST-005`, priced 100 to 500.
    Test,
    /// Products read from a YAML file.
    File(String),
}

/// Parse a YAML product list.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or a SKU is invalid.
pub fn parse_catalog(content: &str) -> Result<Vec<NewProduct>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Load the products for `source` and validate them.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or lists every
/// validation problem found.
pub async fn load_catalog(
    source: &CatalogSource,
) -> Result<Vec<NewProduct>, Box<dyn std::error::Error>> {
    let products = match source {
        CatalogSource::Demo => demo_catalog(),
        CatalogSource::Test => test_catalog(),
        CatalogSource::File(file_path) => {
            let path = Path::new(file_path);
            if !path.exists() {
                return Err(format!("File not found: {file_path}").into());
            }

            info!(path = %file_path, "Loading catalog from file");
            let content = tokio::fs::read_to_string(path).await?;
            parse_catalog(&content)?
        }
    };

    report_errors(&validate_catalog(&products))?;
    Ok(products)
}

fn report_errors(errors: &[ProductError]) -> Result<(), Box<dyn std::error::Error>> {
    if errors.is_empty() {
        return Ok(());
    }

    error!("Catalog validation failed:");
    for err in errors {
        error!("  - {err}");
    }
    Err(format!("{} validation errors found", errors.len()).into())
}

/// Seed products from `source`.
///
/// # Errors
///
/// Returns an error if the catalog is invalid, the database URL is missing,
/// or any insert fails. Nothing is inserted when an insert fails.
pub async fn run(source: &CatalogSource) -> Result<(), Box<dyn std::error::Error>> {
    let products = load_catalog(source).await?;
    info!(products = products.len(), "Catalog validated successfully");

    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    let report = repo.seed(&products).await?;
    let total = repo.count().await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", report.inserted);
    info!("  Products skipped (already exist): {}", report.skipped);
    info!("  Products in catalog: {total}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_parse_catalog() {
        let products = parse_catalog(
            r#"
- title: Desk Lamp
  sku: home-lm-001
  price: "49.90"
  images: [lamp.jpg]
  description: Warm light
- title: Notebook
  sku: STAT-NB-002
  price: "4.50"
"#,
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].sku.as_str(), "HOME-LM-001");
        assert_eq!(products[0].price, Decimal::new(4990, 2));
        assert_eq!(products[1].images, Vec::<String>::new());
        assert_eq!(products[1].description, None);
    }

    #[test]
    fn test_parse_catalog_rejects_invalid_sku() {
        let result = parse_catalog(
            r#"
- title: Broken
  sku: "BAD SKU"
  price: "1.00"
"#,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_builtin_catalogs() {
        assert_eq!(load_catalog(&CatalogSource::Demo).await.unwrap().len(), 5);
        assert_eq!(load_catalog(&CatalogSource::Test).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_catalog(&CatalogSource::File("does-not-exist.yaml".to_string()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_report_errors() {
        assert!(report_errors(&[]).is_ok());

        let sku = test_catalog()[0].sku.clone();
        let err = report_errors(&[ProductError::DuplicateSku(sku)]).unwrap_err();
        assert_eq!(err.to_string(), "1 validation errors found");
    }
}
