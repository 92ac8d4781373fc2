use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed cause of a failed rebuild
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failures surfaced at the index boundary.
///
/// Short queries and stale record references are not errors; they
/// produce empty results and empty contents respectively.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No committed index can be opened for reading
    #[error("search index unavailable at {}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: Option<tantivy::TantivyError>,
    },

    /// A rebuild failed before its commit; the previous index is untouched
    #[error("index rebuild failed: {0}")]
    Write(#[source] BoxError),

    /// Another rebuild holds the writer
    #[error("another index rebuild is already in progress")]
    RebuildInProgress,

    /// Query execution failed against an open snapshot
    #[error("search failed: {0}")]
    Search(#[source] tantivy::TantivyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IndexError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: Option<tantivy::TantivyError>) -> Self {
        IndexError::Unavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(err: impl Into<BoxError>) -> Self {
        IndexError::Write(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message_names_path() {
        let err = IndexError::unavailable("/tmp/missing-index", None);
        assert!(err.to_string().contains("/tmp/missing-index"));
    }

    #[test]
    fn test_write_keeps_source() {
        let err = IndexError::write("disk full");
        assert!(err.to_string().contains("disk full"));
        assert!(err.source().is_some());
    }
}
