use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};

use tantivy::{
    Index, IndexReader, IndexSettings, IndexWriter, ReloadPolicy, Searcher,
    directory::MmapDirectory, index::SegmentId,
};
use tracing::{debug, info, warn};

use super::common::{INDEX_METADATA_FILE, IndexMetadata, MIN_WRITER_HEAP_SIZE};
use super::error::IndexError;
use super::schema::RecordSchema;
use super::tokenizer::register_folding_tokenizer;

/// An opened index with its reader
struct OpenIndex {
    index: Index,
    schema: RecordSchema,
    reader: IndexReader,
}

impl OpenIndex {
    fn open(path: &Path) -> tantivy::Result<Self> {
        let mmap_directory = MmapDirectory::open(path)?;
        let index = Index::open(mmap_directory)?;
        Self::from_index(index)
    }

    fn create(path: &Path) -> tantivy::Result<Self> {
        let schema = RecordSchema::new();
        let mmap_directory = MmapDirectory::open(path)?;
        let index = Index::create(mmap_directory, schema.schema.clone(), IndexSettings::default())?;
        Self::from_index(index)
    }

    fn from_index(index: Index) -> tantivy::Result<Self> {
        register_folding_tokenizer(&index);
        let schema = RecordSchema::from_index(&index)?;

        // Commits from other processes are picked up by the watcher; our own
        // commits also reload explicitly
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()?;

        Ok(Self {
            index,
            schema,
            reader,
        })
    }
}

/// The on-disk record index.
///
/// Any number of [`IndexSnapshot`]s may be open at once; at most one
/// [`IndexWriteGuard`] exists at a time.
pub struct IndexStore {
    path: PathBuf,
    writer_heap_size: usize,
    rebuild_lock: Mutex<()>,
    opened: RwLock<Option<Arc<OpenIndex>>>,
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore")
            .field("path", &self.path)
            .field("writer_heap_size", &self.writer_heap_size)
            .finish()
    }
}

impl IndexStore {
    /// Create a store rooted at `path`. Nothing is opened until first use.
    pub fn new(path: impl Into<PathBuf>, writer_heap_size: usize) -> Self {
        Self {
            path: path.into(),
            writer_heap_size: writer_heap_size.max(MIN_WRITER_HEAP_SIZE),
            rebuild_lock: Mutex::new(()),
            opened: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a committed index exists on disk
    pub fn index_exists(&self) -> bool {
        self.path.join(INDEX_METADATA_FILE).exists()
    }

    /// Open a read snapshot of the last committed rebuild
    pub fn open_for_read(&self) -> Result<IndexSnapshot, IndexError> {
        let open = self.open_existing()?;
        let searcher = open.reader.searcher();

        // An index created by a writer that never committed a rebuild has no payload
        let metas = open
            .index
            .load_metas()
            .map_err(|e| IndexError::unavailable(&self.path, Some(e)))?;
        let Some(payload) = metas.payload.as_deref() else {
            return Err(IndexError::unavailable(&self.path, None));
        };

        // meta.json may already describe a newer commit than the searcher
        let searcher_segments: HashSet<SegmentId> = searcher
            .segment_readers()
            .iter()
            .map(|reader| reader.segment_id())
            .collect();
        let committed_segments: HashSet<SegmentId> =
            metas.segments.iter().map(|meta| meta.id()).collect();

        let metadata = if searcher_segments != committed_segments {
            debug!("Reader is behind the last commit; metadata omitted");
            None
        } else {
            match serde_json::from_str::<IndexMetadata>(payload) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    warn!("Ignoring unreadable commit metadata: {}", e);
                    None
                }
            }
        };

        Ok(IndexSnapshot {
            searcher,
            schema: open.schema.clone(),
            metadata,
        })
    }

    /// Acquire the single writer, creating the index on first use.
    ///
    /// Fails fast with [`IndexError::RebuildInProgress`] if another
    /// rebuild holds the writer.
    pub fn open_for_write(&self) -> Result<IndexWriteGuard<'_>, IndexError> {
        let lock = match self.rebuild_lock.try_lock() {
            Ok(lock) => lock,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(IndexError::RebuildInProgress),
        };

        let open = self.open_or_create()?;
        let writer: IndexWriter = open.index.writer(self.writer_heap_size).map_err(|e| match e {
            tantivy::TantivyError::LockFailure(..) => IndexError::RebuildInProgress,
            other => IndexError::write(other),
        })?;

        debug!("Index writer acquired for {:?}", self.path);

        Ok(IndexWriteGuard {
            writer,
            open,
            _lock: lock,
        })
    }

    fn cached(&self) -> Option<Arc<OpenIndex>> {
        self.opened
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, open: OpenIndex) -> Arc<OpenIndex> {
        let mut slot = self.opened.write().unwrap_or_else(PoisonError::into_inner);
        slot.get_or_insert_with(|| Arc::new(open)).clone()
    }

    fn open_existing(&self) -> Result<Arc<OpenIndex>, IndexError> {
        if let Some(open) = self.cached() {
            return Ok(open);
        }

        if !self.index_exists() {
            return Err(IndexError::unavailable(&self.path, None));
        }

        info!("Opening existing index: {:?}", self.path);
        let open = OpenIndex::open(&self.path)
            .map_err(|e| IndexError::unavailable(&self.path, Some(e)))?;
        Ok(self.remember(open))
    }

    fn open_or_create(&self) -> Result<Arc<OpenIndex>, IndexError> {
        if let Some(open) = self.cached() {
            return Ok(open);
        }

        std::fs::create_dir_all(&self.path)?;

        let open = if self.index_exists() {
            info!("Opening existing index: {:?}", self.path);
            OpenIndex::open(&self.path)
        } else {
            info!("Creating new index: {:?}", self.path);
            OpenIndex::create(&self.path)
        }
        .map_err(IndexError::write)?;

        Ok(self.remember(open))
    }
}

/// A consistent, read-only view of one committed rebuild
pub struct IndexSnapshot {
    searcher: Searcher,
    schema: RecordSchema,
    metadata: Option<IndexMetadata>,
}

impl IndexSnapshot {
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Metadata committed with the rebuild this snapshot reads, if the
    /// reader has caught up with the last commit on disk
    pub fn metadata(&self) -> Option<&IndexMetadata> {
        self.metadata.as_ref()
    }

    pub fn num_docs(&self) -> u64 {
        self.searcher.num_docs()
    }
}

/// Exclusive write access to the index.
///
/// Dropping the guard without [`commit`](Self::commit) discards every
/// pending change and releases the writer.
pub struct IndexWriteGuard<'a> {
    // Field order matters: the writer is dropped before the lock is released
    writer: IndexWriter,
    open: Arc<OpenIndex>,
    _lock: MutexGuard<'a, ()>,
}

impl IndexWriteGuard<'_> {
    pub fn writer(&mut self) -> &mut IndexWriter {
        &mut self.writer
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.open.schema
    }

    /// Atomically publish all pending changes, then refresh the reader
    /// so snapshots opened afterwards see them.
    pub fn commit(mut self, metadata: &IndexMetadata) -> Result<(), IndexError> {
        let payload = serde_json::to_string(metadata).map_err(IndexError::write)?;

        let mut prepared = self.writer.prepare_commit().map_err(IndexError::write)?;
        prepared.set_payload(&payload);
        prepared.commit().map_err(IndexError::write)?;

        self.open.reader.reload().map_err(IndexError::write)?;
        Ok(())
    }

    /// Discard all pending changes
    pub fn rollback(mut self) {
        if let Err(e) = self.writer.rollback() {
            warn!("Index writer rollback failed: {}", e);
        }
    }
}
