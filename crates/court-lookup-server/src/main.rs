//! Court Lookup entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use court_lookup::{CaseQuery, CourtScraper, CourtSource};
use court_lookup_server::config::{build_service, resolve_db_path, scraper_config};
use court_lookup_server::output::{print_json, render_history, render_payload};
use court_lookup_server::rest::{self, AppState, HISTORY_LIMIT};

#[derive(Parser)]
#[command(
    name = "court-lookup",
    about = "Court Lookup: case status from court websites, with a local query log",
    version
)]
struct Cli {
    /// Path to the SQLite query log.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Court source (delhi_high, district, district:<name>).
    #[arg(long, global = true, default_value = "delhi_high")]
    source: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    Serve {
        /// Listen address (host:port).
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },

    /// Look up a case: live retrieval, placeholder fallback, recorded in the log.
    Lookup {
        case_type: String,
        case_number: String,
        filing_year: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Query the court site only. No fallback and nothing is recorded.
    Fetch {
        case_type: String,
        case_number: String,
        filing_year: String,
    },

    /// Show recent lookups, newest first.
    History {
        #[arg(long, default_value_t = HISTORY_LIMIT)]
        limit: usize,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { addr } => {
            let source: CourtSource = cli.source.parse()?;
            let db_path = resolve_db_path(cli.db.as_deref());
            let service = build_service(&db_path, source)?;
            tracing::info!(
                "Court Lookup v{} (source: {})",
                env!("CARGO_PKG_VERSION"),
                service.source()
            );
            rest::start(&addr, Arc::new(AppState { service })).await?;
        }

        Commands::Lookup {
            case_type,
            case_number,
            filing_year,
            json,
        } => {
            let source: CourtSource = cli.source.parse()?;
            let query = CaseQuery::new(&case_type, &case_number, &filing_year)?;
            let service = build_service(&resolve_db_path(cli.db.as_deref()), source)?;
            let outcome = service.lookup(&query).await;

            if json {
                print_json(&serde_json::json!({
                    "success": true,
                    "data": outcome.payload,
                    "origin": outcome.origin,
                    "record_id": outcome.record_id,
                }));
            } else {
                println!(
                    "Case {}/{}/{}",
                    query.case_type, query.case_number, query.filing_year
                );
                print!("{}", render_payload(&outcome.payload, Some(outcome.origin)));
            }
        }

        Commands::Fetch {
            case_type,
            case_number,
            filing_year,
        } => {
            let query = CaseQuery::new(&case_type, &case_number, &filing_year)?;
            let scraper = CourtScraper::new(scraper_config()?)?;
            let payload = scraper
                .fetch_by_name(&query, &cli.source)
                .await
                .with_context(|| format!("fetch from '{}' failed", cli.source))?;
            print!("{}", render_payload(&payload, None));
        }

        Commands::History { limit, json } => {
            let source: CourtSource = cli.source.parse()?;
            let service = build_service(&resolve_db_path(cli.db.as_deref()), source)?;
            let records = service.history(limit).await?;

            if json {
                print_json(&serde_json::to_value(&records)?);
            } else {
                print!("{}", render_history(&records));
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "court-lookup", &mut std::io::stdout());
        }
    }

    Ok(())
}
