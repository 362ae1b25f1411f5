use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use verbatim::config::Config;
use verbatim::db::{Database, SqliteDatabase};

/// Verbatim: plagiarism detection with TF-IDF cosine similarity.
///
/// Checks a text against a stored reference corpus, or compares two texts
/// directly, and reports the terms that drive the similarity.
#[derive(Parser)]
#[command(name = "verbatim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Add a document to the reference corpus
    Add {
        /// The document text (or a file path with --file)
        input: String,

        /// Treat the input as a path and read the text from it
        #[arg(long)]
        file: bool,
    },

    /// Check a text against every stored document
    Check {
        /// The text to check (or a file path with --file)
        input: String,

        /// Treat the input as a path and read the text from it
        #[arg(long)]
        file: bool,
    },

    /// Compare two texts directly
    Compare {
        /// First text (or file path with --files)
        first: String,

        /// Second text (or file path with --files)
        second: String,

        /// Treat both inputs as paths
        #[arg(long)]
        files: bool,
    },

    /// Show system status (DB size, document and user counts)
    Status,

    /// Run the web API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (overrides VERBATIM_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (overrides VERBATIM_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("verbatim=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing Verbatim database...");
            let config = Config::load()?;
            let db = init_database(&config)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext: add reference documents with `verbatim add <text>`");
        }

        Commands::Add { input, file } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let text = read_input(&input, file)?;

            match db.store_document_text(&text, None).await {
                Ok(id) => {
                    info!(document_id = id, "Document added");
                    println!("{}", "Content added to the database successfully.".bold());
                    println!("  Document ID: {id}");
                }
                Err(e) => {
                    error!(error = %e, "Failed to add document");
                    println!("{} {e:#}", "Failed to add document:".red());
                }
            }
        }

        Commands::Check { input, file } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let text = read_input(&input, file)?;

            let corpus = db.list_document_texts().await?;
            println!("Checking against {} stored documents...", corpus.len());

            let report =
                verbatim::similarity::detection::detect_against_corpus(&text, &corpus)?;
            verbatim::output::terminal::display_corpus_report(&report);
        }

        Commands::Compare {
            first,
            second,
            files,
        } => {
            let first = read_input(&first, files)?;
            let second = read_input(&second, files)?;

            let report = verbatim::similarity::detection::compare_texts(&first, &second)?;
            verbatim::output::terminal::display_pair_report(&report);
        }

        Commands::Status => {
            let config = Config::load()?;
            if !Path::new(&config.db_path).exists() {
                println!("Database: not initialized");
                println!("\nRun `verbatim init` to set up the database.");
                return Ok(());
            }
            let db = open_database(&config)?;
            verbatim::status::show(&db, &config.db_path).await?;
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let mut config = Config::load()?;
            config.require_session_secret()?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind = bind;
            }
            let db = init_database(&config)?;
            verbatim::web::run_server(config, db).await?;
        }
    }

    Ok(())
}

/// Create the database file if needed and run migrations.
fn init_database(config: &Config) -> Result<Arc<dyn Database>> {
    let conn = verbatim::db::initialize(&config.db_path)?;
    Ok(Arc::new(SqliteDatabase::new(conn)))
}

/// Open an existing database (fails if `verbatim init` hasn't run).
fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    let conn = verbatim::db::open(&config.db_path)?;
    Ok(Arc::new(SqliteDatabase::new(conn)))
}

/// Return the input itself, or the contents of the file it names.
fn read_input(input: &str, is_path: bool) -> Result<String> {
    if !is_path {
        return Ok(input.to_string());
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))
}
