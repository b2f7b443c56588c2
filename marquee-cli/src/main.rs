mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::{clear, ingest, search, stats};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let engine = context::open_engine(cli.config.as_deref(), cli.index_dir.as_deref())?;
    let format = cli.format;

    match cli.command {
        Command::Ingest(cmd) => ingest::run(cmd, &engine, format),
        Command::Search(cmd) => search::run(cmd, &engine, format),
        Command::Clear => clear::run(&engine),
        Command::Stats => stats::run(&engine, format),
    }
}
