use anyhow::Result;
use marquee::{Engine, SearchRequest};

use crate::cli::SearchCommand;
use crate::output::{self, OutputFormat};

/// Execute a search command.
pub fn run(cmd: SearchCommand, engine: &Engine, format: OutputFormat) -> Result<()> {
    let mut builder = SearchRequest::builder(cmd.query)
        .page(cmd.page)
        .page_size(cmd.page_size)
        .runtime(cmd.min_runtime, cmd.max_runtime)
        .years(cmd.start_year, cmd.end_year);
    if let Some(min_vote) = cmd.min_vote {
        builder = builder.min_vote_average(min_vote);
    }
    let request = builder.build();

    let results = engine.search(&request)?;
    output::print_search_results(&results, request.page, format)?;

    Ok(())
}
