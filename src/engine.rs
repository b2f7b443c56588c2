pub mod config;
pub mod page;
pub mod search;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use log::debug;

use crate::analysis::{Analyzer, StandardAnalyzer};
use crate::error::Result;
use crate::film::{FilmRecord, RawFilmRecord, film_schema};
use crate::ingest;
use crate::lexical::query::{Query, QueryCompiler};
use crate::lexical::search::LexicalSearcher;
use crate::lexical::snapshot::IndexSnapshot;
use crate::lexical::store::{IndexStats, IndexStore};
use crate::storage::{Storage, StorageFactory};
use crate::util::cancel::CancellationToken;

use self::config::{EngineConfig, SearchConfig};
use self::page::RankedHits;
use self::search::{SearchRequest, SearchResultSet};

/// Film search engine.
///
/// A long-lived handle over one index location. Searches run against a
/// snapshot of the last commit and may run concurrently with each other and
/// with a mutation; mutations are serialized.
#[derive(Debug)]
pub struct Engine {
    store: IndexStore,
    compiler: QueryCompiler,
    search: SearchConfig,
}

impl Engine {
    /// Open (or create) the index described by `config`.
    pub fn open(config: EngineConfig) -> Result<Self> {
        let storage = StorageFactory::create(config.storage)?;
        Self::with_storage(storage, config.search)
    }

    /// Open the index held in an existing storage backend.
    pub fn with_storage(storage: Arc<dyn Storage>, search: SearchConfig) -> Result<Self> {
        let analyzer: Arc<dyn Analyzer> = Arc::new(StandardAnalyzer::new());
        let store = IndexStore::open(storage, film_schema(), Arc::clone(&analyzer))?;
        Ok(Engine {
            store,
            compiler: QueryCompiler::new(analyzer, search.clone()),
            search,
        })
    }

    /// Run `request` and return the requested page.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResultSet> {
        Ok(self
            .rank(request)?
            .page(request.page, request.effective_page_size()))
    }

    pub fn search_with_cancel(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResultSet> {
        Ok(self
            .rank_with_cancel(request, cancel)?
            .page(request.page, request.effective_page_size()))
    }

    /// Execute `request` once, keeping the ranking for any number of pages.
    /// The request's own page fields are ignored.
    pub fn rank(&self, request: &SearchRequest) -> Result<RankedHits> {
        self.rank_inner(request, Local::now().date_naive(), None)
    }

    pub fn rank_with_cancel(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<RankedHits> {
        self.rank_inner(request, Local::now().date_naive(), Some(cancel))
    }

    fn rank_inner(
        &self,
        request: &SearchRequest,
        today: NaiveDate,
        cancel: Option<&CancellationToken>,
    ) -> Result<RankedHits> {
        let start = Instant::now();
        let query = self.compiler.compile_at(request, today);
        let searcher = LexicalSearcher::new(self.store.open_read_snapshot());
        let top_docs = searcher.search(&query, self.search.effective_max_hits(), cancel)?;
        debug!(
            "search {:?} -> {} hits ({} ranked) in {:?}",
            query.description(),
            top_docs.total_hits,
            top_docs.score_docs.len(),
            start.elapsed()
        );
        Ok(RankedHits::new(
            Arc::clone(searcher.snapshot()),
            top_docs.score_docs,
            top_docs.total_hits,
        ))
    }

    /// Index `films` as one atomic batch.
    pub fn add_documents(&self, films: Vec<FilmRecord>) -> Result<usize> {
        let docs = films.iter().map(FilmRecord::to_document).collect();
        self.store.add_documents(docs)
    }

    pub fn add_documents_with_cancel(
        &self,
        films: Vec<FilmRecord>,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let docs = films.iter().map(FilmRecord::to_document).collect();
        self.store.add_documents_with_cancel(docs, Some(cancel))
    }

    /// Convert raw rows leniently and index them as one batch.
    pub fn add_raw_records<I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = RawFilmRecord>,
    {
        self.add_documents(records.into_iter().map(FilmRecord::from_raw).collect())
    }

    /// Read a CSV file of films and index every row as one batch.
    pub fn populate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        self.add_raw_records(ingest::read_films_from_csv(path)?)
    }

    /// Remove every film from the index.
    pub fn clear_index(&self) -> Result<()> {
        self.store.delete_all()
    }

    pub fn stats(&self) -> IndexStats {
        self.store.stats()
    }

    /// The index as of the last commit.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.store.open_read_snapshot()
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }
}
