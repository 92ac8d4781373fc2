use serde::{Deserialize, Serialize};
use tracing::warn;

use super::searcher::ScoredHit;
use crate::record::RecordSource;

/// A hit joined back to its source record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    pub title: String,
    pub score: f32,
    pub contents: String,
}

impl SearchResult {
    fn from_hit(hit: ScoredHit, contents: String) -> Self {
        Self {
            id: hit.id,
            title: hit.title,
            score: hit.score,
            contents,
        }
    }
}

/// Attach source contents to each hit, keeping order.
///
/// Hits whose record no longer exists keep empty contents.
pub fn hydrate<S>(source: &S, hits: Vec<ScoredHit>) -> Vec<SearchResult>
where
    S: RecordSource + ?Sized,
{
    hits.into_iter()
        .map(|hit| {
            let contents = match source.get_by_id(hit.id) {
                Some(record) => record.contents,
                None => {
                    warn!("No source record for indexed id {}", hit.id);
                    String::new()
                }
            };
            SearchResult::from_hit(hit, contents)
        })
        .collect()
}
