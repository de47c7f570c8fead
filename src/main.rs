use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Attribute, Cell, Table};
use primo::models::SearchCriteria;
use primo::{load_setup, setup_from_env, SearchResult, Searcher};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Primo - Search an Ex Libris Primo catalogue for holdings and full-text links
#[derive(Parser, Debug)]
#[command(name = "primo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search an Ex Libris Primo catalogue for holdings and full-text links", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Setup file (TOML, YAML or JSON); PRIMO_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up a document by id, or search by ISBN, ISSN or title/author/genre
    #[command(alias = "s")]
    Search {
        /// Primo document id
        #[arg(long)]
        doc_id: Option<String>,

        #[arg(long)]
        isbn: Option<String>,

        #[arg(long)]
        issn: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        author: Option<String>,

        /// Genre, e.g. book, journal or article
        #[arg(long)]
        genre: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("primo={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let setup = match &cli.config {
        Some(path) => load_setup(path)
            .with_context(|| format!("Failed to load setup from {}", path.display()))?,
        None => setup_from_env().context("Failed to read setup from PRIMO_* environment")?,
    };
    tracing::debug!(base_url = %setup.base_url, institution = %setup.institution, "Loaded setup");

    match cli.command {
        Commands::Search {
            doc_id,
            isbn,
            issn,
            title,
            author,
            genre,
        } => {
            let criteria = SearchCriteria {
                doc_id,
                isbn,
                issn,
                title,
                author,
                genre,
            };

            let searcher = Searcher::new(setup)?;
            let result = searcher.search(&criteria).await?;

            if !result.searched() {
                if !cli.quiet {
                    eprintln!(
                        "Not enough search criteria: give --doc-id, --isbn, --issn, \
                         or --title with --author and --genre"
                    );
                }
                return Ok(());
            }

            match cli.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Table => print_tables(&result),
            }
        }
    }

    Ok(())
}

fn print_tables(result: &SearchResult) {
    match result.count {
        Some(count) => println!("Total hits: {}", count),
        None => println!("Total hits: unknown"),
    }
    if let Some(title) = result.titles.first() {
        println!("Title: {}", title);
    }
    if !result.authors.is_empty() {
        println!("Authors: {}", result.authors.join("; "));
    }

    if !result.holdings.is_empty() {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Record", "Library", "Collection", "Call number", "Status"]);
        for holding in &result.holdings {
            table.add_row(vec![
                Cell::new(&holding.record_id).add_attribute(Attribute::Bold),
                Cell::new(holding.library.as_deref().unwrap_or_default()),
                Cell::new(holding.collection().unwrap_or_default()),
                Cell::new(holding.call_number().unwrap_or_default()),
                Cell::new(&holding.status),
            ]);
        }
        println!("{table}");
    }

    let links = result
        .resources
        .iter()
        .map(|r| ("Full text", r.display.as_deref(), r.url.as_str()))
        .chain(
            result
                .tables_of_contents
                .iter()
                .map(|t| ("Contents", t.display.as_deref(), t.url.as_str())),
        )
        .chain(
            result
                .related_links
                .iter()
                .map(|l| ("Related", l.display.as_deref(), l.url.as_str())),
        );

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Kind", "Label", "URL"]);
    let mut rows = 0;
    for (kind, display, url) in links {
        table.add_row(vec![
            Cell::new(kind),
            Cell::new(display.unwrap_or_default()),
            Cell::new(url),
        ]);
        rows += 1;
    }
    if rows > 0 {
        println!("{table}");
    }
}
