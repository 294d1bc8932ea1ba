use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lodgeo::config::Config;

mod commands;

use commands::Session;

#[derive(Parser)]
#[command(
    name = "lodgeo",
    version,
    about = "Linked Open Data lookups and geo enrichment for parsed entities",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); LODGEO_* environment variables otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configuration
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Collect Prometheus metrics and print them to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a person on DBpedia
    Person {
        /// DBpedia resource URI
        id: String,

        /// Language codes; the first one is preferred
        #[arg(short, long)]
        lang: Vec<String>,
    },

    /// Look up a place on DBpedia
    Place {
        /// DBpedia resource URI
        id: String,

        /// Language code for labels and abstracts
        #[arg(short, long)]
        lang: Option<String>,

        /// Only fetch coordinates
        #[arg(long, default_value = "false")]
        position: bool,
    },

    /// Resolve coordinates for a DBpedia, Wikidata or GeoNames identifier
    Point {
        /// Identifier (URI or Wikidata Q-id)
        id: String,
    },

    /// Attach coordinates to the place entities of a JSON file
    Enrich {
        /// Entity file (array or {"entities": [...]})
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!(namespace = %config.cache.namespace, "lodgeo starting");

    let session = Session::open(&config, cli.metrics)?;

    let result = match cli.command {
        Commands::Person { id, lang } => {
            tracing::info!(id = %id, languages = ?lang, "Starting person command");
            commands::person(&session, &id, &lang).await
        }

        Commands::Place { id, lang, position } => {
            tracing::info!(id = %id, lang = ?lang, position = %position, "Starting place command");
            commands::place(&session, &id, lang.as_deref(), position).await
        }

        Commands::Point { id } => {
            tracing::info!(id = %id, "Starting point command");
            commands::point(&session, &id).await
        }

        Commands::Enrich { input, output } => {
            tracing::info!(input = %input.display(), output = ?output, "Starting enrich command");
            commands::enrich(&session, &input, output.as_deref()).await
        }
    };

    // The snapshot is saved even when the command failed
    session.finish(result)?;

    if cli.metrics {
        match lodgeo::metrics::encode_metrics() {
            Ok(text) => eprintln!("{text}"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
        }
    }

    tracing::info!("lodgeo completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("lodgeo=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("lodgeo={level},warn"))
            .context("Invalid log level")?
    };

    // Logs go to stderr, stdout carries the JSON output
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
