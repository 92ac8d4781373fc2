use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::search::common::{
    DEFAULT_FUZZY_DISTANCE, DEFAULT_INDEX_NAME, DEFAULT_MIN_QUERY_LEN, DEFAULT_MIN_RESULTS,
    DEFAULT_WRITER_HEAP_SIZE,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Index name under the data directory
    pub index_name: Option<String>,

    /// Explicit index directory; overrides `index_name`
    pub index_dir: Option<PathBuf>,

    /// Index writer memory budget in bytes
    pub writer_heap_size: usize,

    /// Edit distance for fuzzy clauses (capped at 2)
    pub fuzzy_distance: u8,

    /// Minimum number of result slots requested per search
    pub min_results: usize,

    /// Queries shorter than this after normalization match nothing
    pub min_query_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_name: None,
            index_dir: None,
            writer_heap_size: DEFAULT_WRITER_HEAP_SIZE,
            fuzzy_distance: DEFAULT_FUZZY_DISTANCE,
            min_results: DEFAULT_MIN_RESULTS,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}

impl Config {
    /// Load a JSON config file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Index name, defaulting to `default_index`
    pub fn index_key(&self) -> &str {
        self.index_name.as_deref().unwrap_or(DEFAULT_INDEX_NAME)
    }

    /// Resolved on-disk location of the index
    pub fn index_path(&self) -> PathBuf {
        match &self.index_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("record-search")
                .join(self.index_key()),
        }
    }
}
