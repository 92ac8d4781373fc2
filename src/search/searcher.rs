use serde::{Deserialize, Serialize};
use tantivy::collector::TopDocs;
use tantivy::schema::Value;
use tantivy::TantivyDocument;
use tracing::{debug, warn};

use super::common::DEFAULT_MIN_RESULTS;
use super::error::IndexError;
use super::query_planner::QueryPlan;
use super::schema::RecordSchema;
use super::store::IndexSnapshot;

/// A matched document as read back from the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHit {
    pub id: i64,
    pub title: String,
    pub score: f32,
}

/// Executes query plans against an index snapshot
#[derive(Debug, Clone)]
pub struct RecordSearcher {
    min_results: usize,
}

impl RecordSearcher {
    pub fn new(min_results: usize) -> Self {
        Self { min_results }
    }

    /// Number of hits requested from the index for a caller's `top_n`
    pub fn effective_limit(&self, top_n: usize) -> usize {
        top_n.max(self.min_results)
    }

    /// Run a plan and return hits by descending score.
    ///
    /// Equal scores keep the index's document order.
    pub fn search(
        &self,
        snapshot: &IndexSnapshot,
        plan: &QueryPlan,
        top_n: usize,
    ) -> Result<Vec<ScoredHit>, IndexError> {
        // Never ask the collector for more hits than there are documents
        let limit = self
            .effective_limit(top_n)
            .min(usize::try_from(snapshot.num_docs()).unwrap_or(usize::MAX));
        if plan.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let query = plan.to_query(snapshot.schema()).map_err(IndexError::Search)?;
        let searcher = snapshot.searcher();

        let top_docs = searcher
            .search(query.as_ref(), &TopDocs::with_limit(limit))
            .map_err(IndexError::Search)?;

        debug!("Search executed, got {} results (limit {})", top_docs.len(), limit);

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address).map_err(IndexError::Search)?;
            if let Some(hit) = doc_to_hit(&doc, snapshot.schema(), score) {
                hits.push(hit);
            }
        }

        Ok(hits)
    }
}

impl Default for RecordSearcher {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_RESULTS)
    }
}

/// Read the stored id and title of a matched document
fn doc_to_hit(doc: &TantivyDocument, schema: &RecordSchema, score: f32) -> Option<ScoredHit> {
    let raw_id = doc.get_first(schema.id).and_then(|v| v.as_str()).unwrap_or("");
    let id = match raw_id.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            warn!("Skipping document with non-numeric id {:?}", raw_id);
            return None;
        }
    };

    let title = doc
        .get_first(schema.title)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    Some(ScoredHit { id, title, score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SourceRecord;
    use crate::search::indexer::RecordIndexer;
    use crate::search::query_planner::{QueryPlanner, SearchQuery};
    use crate::search::store::IndexStore;
    use tempfile::TempDir;

    fn record(id: i64, title: &str, contents: &str) -> SourceRecord {
        SourceRecord {
            id,
            title: title.to_string(),
            contents: contents.to_string(),
        }
    }

    fn indexed_store(records: &[SourceRecord]) -> (IndexStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = IndexStore::new(temp_dir.path(), 0);
        RecordIndexer::new(&store).rebuild(records).unwrap();
        (store, temp_dir)
    }

    fn plan(raw: &str) -> QueryPlan {
        QueryPlanner::default().plan(&SearchQuery::new(raw, 10))
    }

    #[test]
    fn test_effective_limit_floor() {
        let searcher = RecordSearcher::default();
        assert_eq!(searcher.effective_limit(0), 3);
        assert_eq!(searcher.effective_limit(1), 3);
        assert_eq!(searcher.effective_limit(3), 3);
        assert_eq!(searcher.effective_limit(10), 10);
    }

    #[test]
    fn test_empty_plan_returns_nothing() {
        let (store, _temp) = indexed_store(&[record(1, "alpha", "beta gamma")]);
        let snapshot = store.open_for_read().unwrap();

        let hits = RecordSearcher::default()
            .search(&snapshot, &QueryPlan::default(), 10)
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_hits_carry_stored_fields() {
        let (store, _temp) = indexed_store(&[
            record(42, "Rust Programming", "systems language"),
            record(43, "", "nothing relevant"),
        ]);
        let snapshot = store.open_for_read().unwrap();

        let hits = RecordSearcher::default()
            .search(&snapshot, &plan("programming"), 10)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 42);
        assert_eq!(hits[0].title, "Rust Programming");
        assert!(hits[0].score > 0.0);
    }

    #[test]
    fn test_floor_returns_at_least_three() {
        let (store, _temp) = indexed_store(&[
            record(1, "Bootstrap grid", "layout"),
            record(2, "Themes", "bootstrap themes"),
            record(3, "Icons", "icons for bootstrap"),
            record(4, "Unrelated", "nothing here"),
        ]);
        let snapshot = store.open_for_read().unwrap();

        let hits = RecordSearcher::default()
            .search(&snapshot, &plan("bootstrap"), 1)
            .unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_hits_ordered_by_score() {
        let (store, _temp) = indexed_store(&[
            record(1, "Other", "zebra"),
            record(2, "Zebra", "plain words only"),
        ]);
        let snapshot = store.open_for_read().unwrap();

        let hits = RecordSearcher::default()
            .search(&snapshot, &plan("zebra"), 10)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn test_huge_top_n_is_clamped_to_document_count() {
        let (store, _temp) = indexed_store(&[
            record(1, "Bootstrap grid", "layout"),
            record(2, "Themes", "bootstrap themes"),
        ]);
        let snapshot = store.open_for_read().unwrap();

        let hits = RecordSearcher::default()
            .search(&snapshot, &plan("bootstrap"), usize::MAX)
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let (store, _temp) = indexed_store(&[]);
        let snapshot = store.open_for_read().unwrap();

        let hits = RecordSearcher::default()
            .search(&snapshot, &plan("bootstrap"), 10)
            .unwrap();
        assert!(hits.is_empty());
    }
}
