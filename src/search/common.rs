use serde::{Deserialize, Serialize};

/// Default heap size for index writer (50MB)
pub const DEFAULT_WRITER_HEAP_SIZE: usize = 50_000_000;

/// Minimum heap size for tantivy 0.24 (15MB)
pub const MIN_WRITER_HEAP_SIZE: usize = 15_000_000;

/// Default index directory name
pub const DEFAULT_INDEX_NAME: &str = "default_index";

/// Index metadata file name
pub const INDEX_METADATA_FILE: &str = "meta.json";

/// Queries shorter than this (after normalization) match nothing
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Minimum number of result slots requested per search
pub const DEFAULT_MIN_RESULTS: usize = 3;

/// Default edit distance for fuzzy clauses
pub const DEFAULT_FUZZY_DISTANCE: u8 = 2;

/// Largest edit distance the fuzzy automaton supports
pub const MAX_FUZZY_DISTANCE: u8 = 2;

/// Terms of this many bytes or more are not indexed
pub const MAX_TERM_LENGTH: usize = 256;

/// Metadata committed together with each rebuild
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub version: String,
    pub record_count: usize,
    pub built_at: String,
}

impl IndexMetadata {
    pub fn new(record_count: usize) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            record_count,
            built_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: u64,
    pub segment_count: usize,
    pub metadata: Option<IndexMetadata>,
}
