use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MarqueeError, Result};
use crate::storage::StorageConfig;

/// Default top-K ceiling of a search.
pub const DEFAULT_MAX_HITS: usize = 1000;

/// Configuration for the search engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Where the index lives.
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

impl EngineConfig {
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            storage,
            search: SearchConfig::default(),
        }
    }

    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parse a TOML configuration. Missing sections take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MarqueeError::invalid_config(format!("failed to parse config: {e}")))
    }

    /// Read and parse the TOML configuration file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MarqueeError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| MarqueeError::invalid_config(format!("{}: {e}", path.display())))
    }
}

/// What an empty search phrase (no tokens after analysis) matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPhrase {
    /// Every document, with a constant score, in insertion order.
    #[default]
    MatchAll,
    MatchNone,
}

/// How release-year bounds are compared with stored release dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateComparison {
    /// Calendar comparison against `[Jan 1 of start year, min(Dec 31 of end
    /// year, today)]`.
    #[default]
    Chronological,
    /// Byte-wise comparison of the stored `YYYY-MM-DD` string against the
    /// bare year strings. Dates inside the end year sort after the end year
    /// itself and are excluded; kept for compatibility with indexes queried
    /// that way historically.
    Lexicographic,
}

/// Query-time behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Ranked hits retained per search. The total match count is exact
    /// regardless; hits ranked below this ceiling cannot be paged to.
    pub max_hits: usize,
    pub empty_phrase: EmptyPhrase,
    pub date_comparison: DateComparison,
}

impl SearchConfig {
    /// `max_hits`, never below one.
    pub fn effective_max_hits(&self) -> usize {
        self.max_hits.max(1)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_hits: DEFAULT_MAX_HITS,
            empty_phrase: EmptyPhrase::default(),
            date_comparison: DateComparison::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    pub fn max_hits(mut self, max_hits: usize) -> Self {
        self.config.search.max_hits = max_hits;
        self
    }

    pub fn empty_phrase(mut self, empty_phrase: EmptyPhrase) -> Self {
        self.config.search.empty_phrase = empty_phrase;
        self
    }

    pub fn date_comparison(mut self, date_comparison: DateComparison) -> Self {
        self.config.search.date_comparison = date_comparison;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
