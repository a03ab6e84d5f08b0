//! searchql CLI
//!
//! Command-line interface for the search query language:
//! - Parse and pretty-print queries
//! - Execute queries against JSON or CSV records
//! - Compile queries to the DSL and query-string forms
//! - Inspect date expressions

use anyhow::Context;
use clap::{Parser, Subcommand};
use searchql::config::{generate_default_config, Config, LoggingConfig};
use searchql::date;
use searchql::query::{print_query, ParseOptions, Query, QueryError};
use serde_json::Value as Json;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "searchql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse, execute and compile search-bar queries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a query and print its canonical text and AST
    Parse {
        /// Query text
        query: String,
    },

    /// Run a query against a file of records
    Execute {
        /// Query text
        query: String,
        /// JSON array or CSV file with a header row
        #[arg(short, long)]
        input: PathBuf,
        /// Fields searched by free-text terms
        #[arg(short = 'f', long)]
        default_field: Vec<String>,
        /// Attach a per-clause trail to each match
        #[arg(long)]
        explain: bool,
    },

    /// Compile a query to the search engine's query object
    Dsl {
        /// Query text
        query: String,
        /// Fields searched by free-text terms
        #[arg(short = 'f', long)]
        default_field: Vec<String>,
    },

    /// Compile a query to a query string
    QueryString {
        /// Query text
        query: String,
    },

    /// Parse a date expression (e.g. "last week", "2024-03-15", "March 2024")
    Date {
        /// Date expression
        expression: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    let parse_options = config.parser.to_parse_options();

    match cli.command {
        Commands::Parse { query } => {
            let query = parse_or_exit(&query, &parse_options)?;
            let output = serde_json::json!({
                "text": print_query(query.ast()),
                "ast": query.ast(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Execute {
            query,
            input,
            default_field,
            explain,
        } => {
            let query = parse_or_exit(&query, &parse_options)?;
            let records = load_records(&input)?;

            let mut options = config.execution.to_execute_options();
            if !default_field.is_empty() {
                options = options.default_fields(default_field);
            }
            if explain {
                options = options.explain(true);
            }

            let matches = Query::execute(&query, &records, &options)?;
            tracing::info!("{} of {} records matched", matches.len(), records.len());
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }

        Commands::Dsl {
            query,
            default_field,
        } => {
            let query = parse_or_exit(&query, &parse_options)?;
            let mut options = config.execution.to_dsl_options();
            if !default_field.is_empty() {
                options = options.default_fields(default_field);
            }
            let dsl = Query::to_query_dsl(&query, &options)?;
            println!("{}", serde_json::to_string_pretty(&dsl)?);
        }

        Commands::QueryString { query } => {
            let query = parse_or_exit(&query, &parse_options)?;
            println!("{}", Query::to_query_string(&query)?);
        }

        Commands::Date { expression } => match date::parse(&expression) {
            Ok(value) => {
                let output = serde_json::json!({
                    "granularity": value.granularity(),
                    "format": value.format(),
                    "instant": date::print_iso8601(value.instant()),
                    "text": date::print(&value, None),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("searchql={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Parse query text; diagnostics are printed as JSON and end the process
fn parse_or_exit(text: &str, options: &ParseOptions) -> anyhow::Result<Query> {
    match Query::parse_with(text, options) {
        Ok(query) => Ok(query),
        Err(QueryError::Parse(errors)) => {
            println!("{}", serde_json::to_string_pretty(&errors)?);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Load records from a JSON array (or single value) or a CSV file with headers
fn load_records(path: &Path) -> anyhow::Result<Vec<Json>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let mut reader =
            csv::Reader::from_path(path).with_context(|| format!("Failed to open {:?}", path))?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.with_context(|| format!("Failed to read {:?}", path))?;
            let record: serde_json::Map<String, Json> = headers
                .iter()
                .zip(row.iter())
                .map(|(header, value)| (header.to_string(), Json::String(value.to_string())))
                .collect();
            records.push(Json::Object(record));
        }
        return Ok(records);
    }

    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let value: Json =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))?;
    Ok(match value {
        Json::Array(items) => items,
        other => vec![other],
    })
}
