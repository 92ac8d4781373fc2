use std::path::PathBuf;

use tracing::{debug, info};

use super::common::{
    DEFAULT_FUZZY_DISTANCE, DEFAULT_MIN_QUERY_LEN, DEFAULT_MIN_RESULTS, DEFAULT_WRITER_HEAP_SIZE,
    IndexStats,
};
use super::error::{BoxError, IndexError};
use super::hydrator::{SearchResult, hydrate};
use super::indexer::RecordIndexer;
use super::query_planner::{QueryPlanner, SearchQuery};
use super::searcher::RecordSearcher;
use super::store::IndexStore;
use crate::config::Config;
use crate::record::{RecordSource, SourceRecord};

/// Main search manager that coordinates rebuilding and searching
pub struct SearchManager<S> {
    store: IndexStore,
    planner: QueryPlanner,
    searcher: RecordSearcher,
    source: S,
}

impl<S> std::fmt::Debug for SearchManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchManager")
            .field("store", &self.store)
            .field("planner", &self.planner)
            .finish()
    }
}

impl<S: RecordSource> SearchManager<S> {
    /// Create a search manager from config
    pub fn new_with_config(config: &Config, source: S) -> Self {
        let index_path = config.index_path();
        info!("Index: {} at {:?}", config.index_key(), index_path);

        Self {
            store: IndexStore::new(index_path, config.writer_heap_size),
            planner: QueryPlanner::new(config.min_query_len, config.fuzzy_distance),
            searcher: RecordSearcher::new(config.min_results),
            source,
        }
    }

    /// Create a search manager with default settings for testing
    pub fn new_for_testing(index_path: impl Into<PathBuf>, source: S) -> Self {
        Self {
            store: IndexStore::new(index_path, DEFAULT_WRITER_HEAP_SIZE),
            planner: QueryPlanner::new(DEFAULT_MIN_QUERY_LEN, DEFAULT_FUZZY_DISTANCE),
            searcher: RecordSearcher::new(DEFAULT_MIN_RESULTS),
            source,
        }
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Search the index and hydrate hits from the record source.
    ///
    /// Blank or too-short queries return no results without opening the index.
    pub fn search(
        &self,
        raw_query: &str,
        requested_count: usize,
    ) -> Result<Vec<SearchResult>, IndexError> {
        debug!(
            "SearchManager::search called with query: '{}', limit: {}",
            raw_query, requested_count
        );

        let query = SearchQuery::new(raw_query, requested_count);
        let plan = self.planner.plan(&query);
        if plan.is_empty() {
            debug!("Query too short, skipping index");
            return Ok(Vec::new());
        }

        let snapshot = self.store.open_for_read()?;
        let hits = self
            .searcher
            .search(&snapshot, &plan, query.requested_count)?;

        debug!("Search returned {} hits", hits.len());
        Ok(hydrate(&self.source, hits))
    }

    /// Replace the index with `records`
    pub fn rebuild_index(&self, records: &[SourceRecord]) -> Result<(), IndexError> {
        RecordIndexer::new(&self.store).rebuild(records)?;
        Ok(())
    }

    /// Replace the index with a stream of records; any `Err` aborts it
    pub fn rebuild_from_iter<I, E>(&self, records: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = Result<SourceRecord, E>>,
        E: Into<BoxError>,
    {
        RecordIndexer::new(&self.store).rebuild_from_iter(records)?;
        Ok(())
    }

    /// Replace the index with everything the record source holds
    pub fn rebuild_from_source(&self) -> Result<(), IndexError> {
        let records = self.source.list_all();
        self.rebuild_index(&records)
    }

    /// Get index statistics
    pub fn stats(&self) -> Result<IndexStats, IndexError> {
        let snapshot = self.store.open_for_read()?;

        Ok(IndexStats {
            total_documents: snapshot.num_docs(),
            segment_count: snapshot.searcher().segment_readers().len(),
            metadata: snapshot.metadata().cloned(),
        })
    }
}
