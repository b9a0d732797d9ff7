//! Listing reconciliation CLI
//!
//! Runs reconciliation batches over captured listing files and manages the
//! suppression store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use listing_recon::{
    error::{AppError, Result},
    models::{CategoryConfig, ClassifierStrategy, Config},
    pipeline::{BatchOutcome, Pipeline},
    services::classifier_for,
    storage::LocalSuppressionStore,
    utils::console,
};

/// listing-recon - Duplicate and empty SKU monitor
#[derive(Parser, Debug)]
#[command(
    name = "listing-recon",
    version,
    about = "Reconciles captured listings and alerts on duplicate or empty SKUs"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one batch per category
    Scan {
        /// Only scan this category
        #[arg(long)]
        category: Option<String>,

        /// Print the alert instead of sending it and leave the store untouched
        #[arg(long)]
        dry_run: bool,

        /// Print batch outcomes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run batches every scheduler interval
    Watch {
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u32>,
    },

    /// Classify seller codes
    Classify {
        /// Use the legacy classifier instead of the configured one
        #[arg(long)]
        legacy: bool,

        /// Codes to classify
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Merge, de-duplicate and sort suppression files
    Compact {
        /// Only compact this category
        #[arg(long)]
        category: Option<String>,

        /// Legacy suppression files to merge in (requires --category)
        #[arg(long, requires = "category")]
        legacy: Vec<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Categories selected by an optional name filter.
fn select_categories<'a>(
    config: &'a Config,
    name: Option<&str>,
) -> Result<Vec<&'a CategoryConfig>> {
    match name {
        Some(name) => config
            .category(name)
            .map(|c| vec![c])
            .ok_or_else(|| AppError::config(format!("Unknown category '{}'", name))),
        None => Ok(config.categories.iter().collect()),
    }
}

fn print_outcome(outcome: &BatchOutcome) {
    console::summary(
        &format!("Batch {}", outcome.category),
        &outcome.summary_rows(),
    );
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            if matches!(cli.command, Command::Validate) {
                log::error!("Cannot load {}: {}", cli.config.display(), e);
                return Err(e);
            }
            if !matches!(cli.command, Command::Init { .. }) {
                log::warn!(
                    "Config load failed from {}: {}. Using defaults.",
                    cli.config.display(),
                    e
                );
            }
            Config::default()
        }
    };

    match cli.command {
        Command::Scan {
            category,
            dry_run,
            json,
        } => {
            config.validate()?;
            let categories: Vec<CategoryConfig> =
                select_categories(&config, category.as_deref())?
                    .into_iter()
                    .cloned()
                    .collect();

            let pipeline = Pipeline::from_config(&config, dry_run)?;
            if !json {
                console::header(if dry_run { "Scan (dry run)" } else { "Scan" });
            }
            let outcomes = pipeline.run_categories(&categories).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                outcomes.iter().for_each(print_outcome);
            }
        }

        Command::Watch { cycles } => {
            config.validate()?;
            let pipeline = Pipeline::from_config(&config, false)?;
            if let Some(flag) = pipeline.pause_signal().flag_file() {
                log::info!("Create {} to pause between phases", flag.display());
            }

            console::header("Watch");
            pipeline
                .watch(
                    &config.categories,
                    config.scheduler.interval(),
                    cycles,
                    print_outcome,
                )
                .await;
        }

        Command::Classify { legacy, codes } => {
            let strategy = if legacy {
                ClassifierStrategy::Legacy
            } else {
                config.classifier.strategy
            };
            let classifier = classifier_for(strategy);

            for code in &codes {
                let analysis = classifier.analyze(code);
                println!(
                    "{:?} -> {} (prefix: {}, formatted: {})",
                    code,
                    analysis.class,
                    analysis.prefix_or_unknown(),
                    analysis.formatted().unwrap_or_else(|| "-".to_string())
                );
            }
        }

        Command::Compact { category, legacy } => {
            let store = LocalSuppressionStore::new(&config.store.dir);
            for selected in select_categories(&config, category.as_deref())? {
                let rows = store.consolidate(&selected.name, &legacy).await?;
                console::sub_item(&format!("{}: {} rows", selected.name, rows));
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} categories, {} classifier)",
                config.categories.len(),
                classifier_for(config.classifier.strategy).name()
            );
        }

        Command::Init { force } => {
            if cli.config.exists() && !force {
                log::warn!(
                    "{} already exists. Use --force to overwrite.",
                    cli.config.display()
                );
                return Ok(());
            }

            std::fs::write(&cli.config, Config::default().to_toml()?)?;
            log::info!("Default configuration written to {}", cli.config.display());
        }
    }

    Ok(())
}
