// Module declarations
pub mod common;
pub mod error;
pub mod hydrator;
pub mod indexer;
pub mod normalizer;
pub mod query_planner;
pub mod schema;
pub mod search_manager;
pub mod searcher;
pub mod store;
pub mod tokenizer;

// Re-export public APIs
pub use common::{IndexMetadata, IndexStats};
pub use error::IndexError;
pub use hydrator::{SearchResult, hydrate};
pub use indexer::RecordIndexer;
pub use normalizer::normalize;
pub use query_planner::{QueryPlan, QueryPlanner, SearchQuery};
pub use schema::{RecordSchema, SearchField};
pub use search_manager::SearchManager;
pub use searcher::{RecordSearcher, ScoredHit};
pub use store::{IndexSnapshot, IndexStore, IndexWriteGuard};
