use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Marquee - film catalog search CLI
#[derive(Parser)]
#[command(name = "marquee", version, about)]
pub struct Cli {
    /// Engine configuration file (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Index directory. Overrides the storage section of the config file.
    #[arg(long, env = "MARQUEE_INDEX_DIR")]
    pub index_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Index every row of a CSV file as one batch.
    Ingest(IngestCommand),
    /// Search the catalog.
    Search(SearchCommand),
    /// Remove every film from the index.
    Clear,
    /// Show index statistics.
    Stats,
}

#[derive(Parser)]
pub struct IngestCommand {
    /// CSV file with a header row.
    pub path: PathBuf,

    /// Clear the index before ingesting.
    #[arg(long)]
    pub clear: bool,
}

#[derive(Parser)]
pub struct SearchCommand {
    /// Phrase to match against title, tagline, and overview.
    #[arg(default_value = "")]
    pub query: String,

    /// Zero-based page number.
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Results per page.
    #[arg(long, default_value_t = 10)]
    pub page_size: usize,

    /// Minimum runtime in minutes.
    #[arg(long)]
    pub min_runtime: Option<i32>,

    /// Maximum runtime in minutes.
    #[arg(long)]
    pub max_runtime: Option<i32>,

    /// Minimum vote average; zero or less disables the filter.
    #[arg(long)]
    pub min_vote: Option<f64>,

    /// First release year.
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last release year. Defaults to the current date.
    #[arg(long)]
    pub end_year: Option<i32>,
}
