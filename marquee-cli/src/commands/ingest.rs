use anyhow::{Context, Result};
use marquee::Engine;
use tracing::info;

use crate::cli::IngestCommand;
use crate::output::{self, OutputFormat};

/// Execute an ingest command.
pub fn run(cmd: IngestCommand, engine: &Engine, format: OutputFormat) -> Result<()> {
    if cmd.clear {
        engine.clear_index().context("Failed to clear index")?;
        info!("cleared index before ingest");
    }

    let added = engine
        .populate_from_csv(&cmd.path)
        .with_context(|| format!("Failed to ingest {}", cmd.path.display()))?;
    println!("Indexed {added} films from {}.", cmd.path.display());
    output::print_stats(&engine.stats(), format)?;

    Ok(())
}
