use anyhow::Result;
use clap::ValueEnum;
use marquee::film::format_date;
use marquee::{FilmHit, IndexStats, SearchResultSet};
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// JSON output.
    Json,
}

/// Print one page of search results.
pub fn print_search_results(
    results: &SearchResultSet,
    page: usize,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = json!({
                "total_hits": results.total_hits,
                "page": page,
                "hits": results.hits,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            if results.is_empty() {
                println!("No results found ({} total).", results.total_hits);
                return Ok(());
            }

            let rows: Vec<FilmRow> = results.hits.iter().map(FilmRow::from).collect();
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");
            println!(
                "Page {page}: {} of {} hits.",
                results.hits.len(),
                results.total_hits
            );
        }
    }
    Ok(())
}

/// Print index statistics.
pub fn print_stats(stats: &IndexStats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(stats)?);
        }
        OutputFormat::Table => {
            let rows = vec![
                StatRow::new("Documents", stats.doc_count),
                StatRow::new("Segments", stats.segment_count),
                StatRow::new("Terms", stats.term_count),
                StatRow::new("Generation", stats.generation),
            ];
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{table}");
        }
    }
    Ok(())
}

// --- Helper types and functions ---

#[derive(Tabled)]
struct FilmRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Released")]
    released: String,
    #[tabled(rename = "Runtime")]
    runtime: i32,
    #[tabled(rename = "Votes")]
    vote_average: String,
    #[tabled(rename = "Score")]
    score: String,
}

impl From<&FilmHit> for FilmRow {
    fn from(hit: &FilmHit) -> Self {
        FilmRow {
            id: hit.id.clone(),
            title: truncate(&hit.title, 60),
            released: format_date(hit.release_date),
            runtime: hit.runtime,
            vote_average: format!("{:.1}", hit.vote_average),
            score: format!("{:.4}", hit.score),
        }
    }
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Statistic")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl StatRow {
    fn new(name: &'static str, value: impl ToString) -> Self {
        StatRow {
            name,
            value: value.to_string(),
        }
    }
}

/// Shorten `s` to at most `max` characters for display.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
