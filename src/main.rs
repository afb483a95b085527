//! Shelterdash CLI - Browse and maintain animal shelter outcome records

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use shelterdash::config::{self, ShelterConfig};
use shelterdash::record::parse_assignment;
use shelterdash::ui::{self, Icons};
use shelterdash::view::RecordView;
use shelterdash::{import, rescue, AnimalRecord, AnimalShelter, FieldMap, FilterCriteria, RescueCategory};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "shelterdash")]
#[command(version = "0.1.0")]
#[command(about = "Animal shelter outcome records, filtered by rescue category")]
#[command(long_about = r#"
Shelterdash keeps animal outcome records in a local SQLite store and finds
candidates for working-dog training by rescue category:
  • Water Rescue
  • Mountain or Wilderness Rescue
  • Disaster Rescue or Individual Tracking

Example usage:
  shelterdash init
  shelterdash import --path aac_shelter_outcomes.json
  shelterdash filter --category water
  shelterdash serve --port 8050
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config and environment)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Collection name (overrides config and environment)
    #[arg(long, global = true)]
    collection: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List records for a rescue category
    Filter {
        /// Rescue category (All, Water, Mountain, Disaster)
        #[arg(short = 'C', long, default_value = "All")]
        category: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Maximum number of rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Add one record
    Create {
        /// The record as a JSON object
        #[arg(long)]
        json: Option<String>,

        /// Field assignment, field=value (repeatable)
        #[arg(short, long = "set")]
        set: Vec<String>,
    },

    /// Merge fields into every matching record
    Update {
        /// Match a rescue category's criteria
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Match records where field equals value, field=value (repeatable)
        #[arg(short, long = "eq")]
        eq: Vec<String>,

        /// Field assignment, field=value (repeatable)
        #[arg(short, long = "set", required = true)]
        set: Vec<String>,
    },

    /// Remove every matching record
    Delete {
        /// Match a rescue category's criteria
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Match records where field equals value, field=value (repeatable)
        #[arg(short, long = "eq")]
        eq: Vec<String>,
    },

    /// Load records from a JSON array or newline-delimited JSON file
    Import {
        /// File to import
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Show how many records are stored
    Count,

    /// Show the rescue category presets
    Categories,

    /// Write a config file and create the database directory
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Serve the JSON API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8050")]
        port: u16,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = resolve_settings(&cli)?;

    match &cli.command {
        Commands::Filter { category, format, limit } => {
            let category: RescueCategory = category.parse()?;
            let shelter = open_shelter(&settings)?;

            let mut view = RecordView::from_records(shelter.read_category(category)?);
            if let Some(limit) = limit {
                view.truncate(*limit);
            }

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
                OutputFormat::Table => {
                    ui::category_header(category);
                    if view.is_empty() {
                        ui::warn("No matching records.");
                    } else {
                        println!("{}", ui::records_table(&view));
                        ui::summary_row("Records:", &view.len().to_string());
                    }
                }
            }
        }

        Commands::Create { json, set } => {
            let mut record = match json {
                Some(text) => {
                    let value: serde_json::Value = serde_json::from_str(text)
                        .context("--json must be a JSON object")?;
                    AnimalRecord::try_from(value)?
                }
                None => AnimalRecord::new(),
            };
            for (field, value) in parse_assignments(set)? {
                record.insert(field, value);
            }

            let shelter = open_shelter(&settings)?;
            if shelter.create(&record)? {
                ui::success("Record saved.");
            } else {
                ui::error("Record was not saved; see the log for details.");
            }
        }

        Commands::Update { category, eq, set } => {
            let query = build_query(category.as_deref(), eq)?;
            let fields: FieldMap = parse_assignments(set)?.into_iter().collect();

            let mut shelter = open_shelter(&settings)?;
            let changed = shelter.update(&query, &fields)?;

            ui::section("Update");
            ui::summary_row("Query:", &query.to_string());
            ui::summary_row("Matched:", &shelter.records_matched().to_string());
            ui::summary_row("Modified:", &shelter.records_updated().to_string());
            if !changed {
                ui::warn("No records were changed.");
            }
        }

        Commands::Delete { category, eq } => {
            let query = build_query(category.as_deref(), eq)?;

            let mut shelter = open_shelter(&settings)?;
            if shelter.delete(&query)? {
                ui::success(&format!("Deleted {} records.", shelter.records_deleted()));
            } else {
                ui::warn("No records were deleted.");
            }
        }

        Commands::Import { path } => {
            let records = import::load_records(path)
                .with_context(|| format!("failed to import {}", path.display()))?;
            let shelter = open_shelter(&settings)?;

            let mut saved = 0usize;
            for (i, record) in records.iter().enumerate() {
                match shelter.create(record) {
                    Ok(true) => saved += 1,
                    Ok(false) => {}
                    Err(e) => tracing::warn!("Skipping record {}: {}", i + 1, e),
                }
            }

            ui::success(&format!("Imported {} of {} records.", saved, records.len()));
        }

        Commands::Count => {
            let shelter = open_shelter(&settings)?;
            let records = shelter.count().to_string();
            let database = settings.database.display().to_string();

            ui::header(Icons::STATS, "Shelter Statistics");
            println!(
                "{}",
                ui::stats_table(&[
                    ("Database", database.as_str()),
                    ("Collection", settings.collection.as_str()),
                    ("Records", records.as_str()),
                ])
            );
        }

        Commands::Categories => {
            ui::header(Icons::DOG, "Rescue Categories");
            println!("{}", ui::categories_table());
        }

        Commands::Init { force } => {
            let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
            let file_config = ShelterConfig {
                database: Some(settings.database.display().to_string()),
                collection: Some(settings.collection.clone()),
            };

            config::write_config(&config_path, &file_config, *force)?;
            config::ensure_db_dir(&settings.database)?;

            ui::success("Shelterdash initialized.");
            ui::info("Config", &config_path.display().to_string());
            ui::info("Database", &settings.database.display().to_string());
        }

        Commands::Serve { port } => {
            let shelter = open_shelter(&settings)?;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(shelterdash::server::start_server(*port, shelter))?;
        }
    }

    Ok(())
}

/// Where the store lives once config file, environment and flags are applied
struct Settings {
    database: PathBuf,
    collection: String,
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let merged = config::load_config(cli.config.as_deref())?;

    let base = std::env::current_dir()?;
    let database = match &cli.database {
        Some(path) => base.join(path),
        None => merged.database_path(&base),
    };
    let collection = cli
        .collection
        .clone()
        .unwrap_or_else(|| merged.collection().to_string());

    tracing::debug!("Resolved store: {} (collection {})", database.display(), collection);
    Ok(Settings { database, collection })
}

fn open_shelter(settings: &Settings) -> anyhow::Result<AnimalShelter> {
    config::ensure_db_dir(&settings.database)?;
    Ok(AnimalShelter::open(&settings.database, &settings.collection)?)
}

fn parse_assignments(inputs: &[String]) -> anyhow::Result<Vec<(String, serde_json::Value)>> {
    Ok(inputs
        .iter()
        .map(|input| parse_assignment(input))
        .collect::<shelterdash::Result<_>>()?)
}

/// Combine an optional category preset with field equalities
fn build_query(category: Option<&str>, eq: &[String]) -> anyhow::Result<FilterCriteria> {
    let mut query = match category {
        Some(name) => rescue::resolve_named(name)?,
        None => FilterCriteria::new(),
    };
    for (field, value) in parse_assignments(eq)? {
        query = query.field_eq(field, value);
    }
    Ok(query)
}
