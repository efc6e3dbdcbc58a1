use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

mod config;
mod error;
mod models;
mod services;

use config::{Config, RegistryConfig};
use services::catalog::CatalogRegistry;
use services::connect::{connect_catalog, prepare_storage_steps, ConnectStep};

#[derive(Parser)]
#[command(name = "lake-connect", version)]
#[command(about = "Connects data lake and lakehouse catalogs to SQL databases")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render and execute the DDL connecting a catalog to a database
    Connect {
        /// Alias of the catalog to connect
        catalog: String,
        /// Target database alias, defaulting to the configured one
        #[arg(long)]
        db_alias: Option<String>,
        /// Drop and recreate objects that already exist
        #[arg(long)]
        replace: bool,
        /// Also create the external storage and file format objects
        #[arg(long)]
        with_storage: bool,
        /// Print statements instead of executing them
        #[arg(long)]
        dry_run: bool,
    },
    /// List the tables discovered for a catalog
    Discover {
        /// Alias of the catalog to discover
        catalog: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let registry_content = std::fs::read_to_string(&config.connect.registry_file)
        .with_context(|| format!("Failed to read {}", config.connect.registry_file))?;
    let mut registry = RegistryConfig::from_json(&registry_content)?.build_registry()?;

    match cli.command {
        Commands::Connect {
            catalog,
            db_alias,
            replace,
            with_storage,
            dry_run,
        } => {
            let db_alias = db_alias.unwrap_or(config.connect.default_db_alias);
            let dry_run = dry_run || config.connect.dry_run;

            let mut steps = Vec::new();
            if with_storage {
                steps.extend(prepare_storage_steps(&mut registry, &catalog, &db_alias, replace).await?);
            }
            steps.extend(connect_catalog(&mut registry, &catalog, &db_alias, replace).await?);

            if dry_run {
                for step in &steps {
                    println!("-- {}\n{}\n", step.id, step.sql);
                }
                info!(steps = steps.len(), "dry run, nothing executed");
            } else {
                run_steps(&registry, &steps).await?;
            }
        }
        Commands::Discover { catalog } => {
            let tables = registry.catalog_tables(&catalog).await?;
            for table in tables {
                println!(
                    "{}{}\t{}\t{}",
                    table
                        .schema
                        .as_deref()
                        .map(|s| format!("{}.", s))
                        .unwrap_or_default(),
                    table.name,
                    table.format.as_ref().map(|f| f.name()).unwrap_or("-"),
                    table.location.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    Ok(())
}

async fn run_steps(registry: &CatalogRegistry, steps: &[ConnectStep]) -> anyhow::Result<()> {
    for step in steps {
        let db = registry.database(&step.db_alias)?;
        db.execute(&step.sql)
            .await
            .with_context(|| format!("Step {} failed", step.id))?;
        info!(step = %step.id, "executed");
    }
    info!(steps = steps.len(), "all statements executed");
    Ok(())
}
