use anyhow::Result;
use marquee::Engine;

use crate::output::{self, OutputFormat};

pub fn run(engine: &Engine, format: OutputFormat) -> Result<()> {
    output::print_stats(&engine.stats(), format)?;
    Ok(())
}
