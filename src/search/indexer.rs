use std::borrow::Borrow;
use std::convert::Infallible;

use tantivy::TantivyDocument;
use tracing::{info, warn};

use super::common::IndexMetadata;
use super::error::{BoxError, IndexError};
use super::schema::RecordSchema;
use super::store::IndexStore;
use crate::record::SourceRecord;

/// Handles full rebuilds of the record index
#[derive(Debug)]
pub struct RecordIndexer<'a> {
    store: &'a IndexStore,
}

impl<'a> RecordIndexer<'a> {
    /// Create a new indexer
    pub fn new(store: &'a IndexStore) -> Self {
        Self { store }
    }

    /// Create a tantivy document from a record.
    ///
    /// The id is always present; title and contents only when non-empty.
    pub fn create_document(schema: &RecordSchema, record: &SourceRecord) -> TantivyDocument {
        let mut doc = TantivyDocument::new();
        doc.add_text(schema.id, record.id.to_string());

        if !record.title.is_empty() {
            doc.add_text(schema.title, &record.title);
        }

        if !record.contents.is_empty() {
            doc.add_text(schema.contents, &record.contents);
        }

        doc
    }

    /// Replace the whole index with `records` in a single commit
    pub fn rebuild(&self, records: &[SourceRecord]) -> Result<usize, IndexError> {
        self.rebuild_from_iter(records.iter().map(Ok::<_, Infallible>))
    }

    /// Replace the whole index with a stream of records.
    ///
    /// The first `Err` in the stream aborts the rebuild without committing,
    /// leaving the previously committed index as it was.
    pub fn rebuild_from_iter<I, R, E>(&self, records: I) -> Result<usize, IndexError>
    where
        I: IntoIterator<Item = Result<R, E>>,
        R: Borrow<SourceRecord>,
        E: Into<BoxError>,
    {
        let mut guard = self.store.open_for_write()?;

        // Clear existing documents
        guard
            .writer()
            .delete_all_documents()
            .map_err(IndexError::write)?;

        let mut indexed = 0;
        for item in records {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    let err = IndexError::Write(e.into());
                    warn!("Aborting rebuild after {} records: {}", indexed, err);
                    guard.rollback();
                    return Err(err);
                }
            };

            let doc = Self::create_document(guard.schema(), Borrow::<SourceRecord>::borrow(&record));
            guard.writer().add_document(doc).map_err(IndexError::write)?;
            indexed += 1;
        }

        guard.commit(&IndexMetadata::new(indexed))?;
        info!("Index rebuilt: {} documents", indexed);

        Ok(indexed)
    }
}
