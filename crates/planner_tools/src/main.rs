//! Formation Planner - Command-line Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planner_tools::error::Result;
use planner_tools::{inspect, validate};

#[derive(Parser)]
#[command(name = "planner-tools")]
#[command(about = "Share-link and data tools for the formation planner")]
struct Cli {
    /// RON catalog to use instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// RON planner config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a share link and print the plan as JSON
    Inspect {
        /// Full URL or query string
        link: String,
    },
    /// Decode a share link and print it in canonical form
    Normalize {
        /// Full URL or query string
        link: String,
    },
    /// Validate a RON unit catalog
    ValidateCatalog {
        /// Path to the catalog file
        path: PathBuf,
    },
    /// Validate a RON planner config
    ValidateConfig {
        /// Path to the config file
        path: PathBuf,
    },
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let catalog = cli.catalog.as_deref();
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Inspect { link } => {
            let registry = validate::catalog_or_builtin(catalog)?;
            let config = validate::config_or_default(config)?;
            let summary = inspect::inspect_link(&link, &registry, &config)?;
            print_json(&summary, cli.pretty)
        }
        Commands::Normalize { link } => {
            let registry = validate::catalog_or_builtin(catalog)?;
            let config = validate::config_or_default(config)?;
            let query = inspect::normalize_link(&link, &registry, &config)?;
            println!("{}", query.to_query_string());
            Ok(())
        }
        Commands::ValidateCatalog { path } => {
            tracing::info!("Validating catalog: {}", path.display());
            let report = validate::validate_catalog(&path)?;
            tracing::info!("Validation passed");
            print_json(&report, cli.pretty)
        }
        Commands::ValidateConfig { path } => {
            tracing::info!("Validating config: {}", path.display());
            let config = validate::load_config(&path)?;
            tracing::info!("Validation passed");
            print_json(&config, cli.pretty)
        }
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
