use anyhow::{Context, Result};
use marquee::Engine;

pub fn run(engine: &Engine) -> Result<()> {
    engine.clear_index().context("Failed to clear index")?;
    println!("Index cleared.");
    Ok(())
}
