//! Shopkeep CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! shopkeep migrate
//!
//! # Seed the demo catalog
//! shopkeep seed
//!
//! # Seed products from a YAML file
//! shopkeep seed --file catalog.yaml
//!
//! # List catalog products
//! shopkeep catalog list
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the product catalog
//! - `catalog list` - List catalog products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use commands::seed::CatalogSource;

mod commands;

#[derive(Parser)]
#[command(name = "shopkeep")]
#[command(author, version, about = "Shopkeep CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the product catalog (demo catalog by default)
    Seed {
        /// YAML file with a list of products
        #[arg(short, long, conflicts_with = "test")]
        file: Option<String>,

        /// Seed the fixed test catalog instead of the demo catalog
        #[arg(long)]
        test: bool,
    },
    /// Inspect the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List every product
    List,
}

impl Commands {
    fn catalog_source(file: Option<String>, test: bool) -> CatalogSource {
        match (file, test) {
            (Some(path), _) => CatalogSource::File(path),
            (None, true) => CatalogSource::Test,
            (None, false) => CatalogSource::Demo,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, test } => {
            commands::seed::run(&Commands::catalog_source(file, test)).await?;
        }
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seed_source(args: &[&str]) -> CatalogSource {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Seed { file, test } => Commands::catalog_source(file, test),
            _ => panic!("expected seed command"),
        }
    }

    #[test]
    fn test_seed_sources() {
        assert_eq!(seed_source(&["shopkeep", "seed"]), CatalogSource::Demo);
        assert_eq!(
            seed_source(&["shopkeep", "seed", "--test"]),
            CatalogSource::Test
        );
        assert_eq!(
            seed_source(&["shopkeep", "seed", "--file", "catalog.yaml"]),
            CatalogSource::File("catalog.yaml".to_string())
        );
    }

    #[test]
    fn test_seed_file_conflicts_with_test() {
        assert!(Cli::try_parse_from(["shopkeep", "seed", "--test", "-f", "a.yaml"]).is_err());
    }

    #[test]
    fn test_catalog_list_parses() {
        let cli = Cli::try_parse_from(["shopkeep", "catalog", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Catalog {
                action: CatalogAction::List
            }
        ));
    }
}
