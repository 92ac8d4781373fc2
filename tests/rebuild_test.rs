use record_search::record::{SourceRecord, StaticRecords, sample_records};
use record_search::search::{
    IndexError, QueryPlanner, RecordSearcher, SearchManager, SearchQuery,
};
use tempfile::TempDir;

fn record(id: i64, title: &str, contents: &str) -> SourceRecord {
    SourceRecord {
        id,
        title: title.to_string(),
        contents: contents.to_string(),
    }
}

fn sample_manager(temp_dir: &TempDir) -> SearchManager<StaticRecords> {
    SearchManager::new_for_testing(temp_dir.path(), StaticRecords::new(sample_records()))
}

fn ids(manager: &SearchManager<StaticRecords>, query: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = manager
        .search(query, 10)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    ids.sort();
    ids
}

#[test]
fn test_search_before_first_rebuild_is_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let manager = sample_manager(&temp_dir);

    let err = manager.search("VDWWD", 10).unwrap_err();
    assert!(matches!(err, IndexError::Unavailable { .. }));
    assert!(matches!(manager.stats(), Err(IndexError::Unavailable { .. })));
}

#[test]
fn test_interrupted_rebuild_keeps_previous_index() {
    let temp_dir = TempDir::new().unwrap();
    let manager = sample_manager(&temp_dir);
    manager.rebuild_from_source().unwrap();

    let replacement = vec![
        Ok(record(10, "Freshly", "xylophone quartet")),
        Ok(record(11, "Another", "xylophone solo")),
        Err("simulated write failure"),
        Ok(record(12, "Never", "xylophone trio")),
    ];
    let err = manager.rebuild_from_iter(replacement).unwrap_err();
    assert!(matches!(err, IndexError::Write(_)));

    assert_eq!(ids(&manager, "VDWWD"), vec![1, 2, 3, 4]);
    assert!(ids(&manager, "xylophone").is_empty());
    assert_eq!(manager.stats().unwrap().total_documents, 4);

    // The writer was released, so a later rebuild succeeds
    manager
        .rebuild_index(&[record(10, "Freshly", "xylophone quartet")])
        .unwrap();
    assert_eq!(ids(&manager, "xylophone"), vec![10]);
    assert!(ids(&manager, "VDWWD").is_empty());
}

#[test]
fn test_rebuild_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let manager = sample_manager(&temp_dir);

    manager.rebuild_from_source().unwrap();
    let first: Vec<(i64, String)> = manager
        .search("VDWWD", 10)
        .unwrap()
        .into_iter()
        .map(|r| (r.id, r.title))
        .collect();

    manager.rebuild_from_source().unwrap();
    let second: Vec<(i64, String)> = manager
        .search("VDWWD", 10)
        .unwrap()
        .into_iter()
        .map(|r| (r.id, r.title))
        .collect();

    assert_eq!(manager.stats().unwrap().total_documents, 4);
    let mut first_sorted = first.clone();
    let mut second_sorted = second.clone();
    first_sorted.sort();
    second_sorted.sort();
    assert_eq!(first_sorted, second_sorted);
}

#[test]
fn test_open_snapshot_survives_rebuild() {
    let temp_dir = TempDir::new().unwrap();
    let manager = sample_manager(&temp_dir);
    manager.rebuild_from_source().unwrap();

    let before = manager.store().open_for_read().unwrap();

    manager
        .rebuild_index(&[record(20, "Replacement", "entirely new corpus")])
        .unwrap();

    let plan = QueryPlanner::default().plan(&SearchQuery::new("VDWWD", 10));
    let searcher = RecordSearcher::default();

    // Snapshot opened before the commit still sees the old corpus
    assert_eq!(before.num_docs(), 4);
    assert_eq!(searcher.search(&before, &plan, 10).unwrap().len(), 4);

    // A snapshot opened after the commit sees only the new one
    let after = manager.store().open_for_read().unwrap();
    assert_eq!(after.num_docs(), 1);
    assert!(searcher.search(&after, &plan, 10).unwrap().is_empty());
}

#[test]
fn test_concurrent_rebuild_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let manager = sample_manager(&temp_dir);
    manager.rebuild_from_source().unwrap();

    let guard = manager.store().open_for_write().unwrap();
    let err = manager.rebuild_from_source().unwrap_err();
    assert!(matches!(err, IndexError::RebuildInProgress));

    // Readers are unaffected by the held writer
    assert_eq!(ids(&manager, "VDWWD"), vec![1, 2, 3, 4]);

    drop(guard);
    manager.rebuild_from_source().unwrap();
}

#[test]
fn test_concurrent_readers() {
    let temp_dir = TempDir::new().unwrap();
    let manager = sample_manager(&temp_dir);
    manager.rebuild_from_source().unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| manager.search("VDWWD", 10).unwrap().len()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 4);
        }
    });
}

#[test]
fn test_index_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    sample_manager(&temp_dir).rebuild_from_source().unwrap();

    let reopened = sample_manager(&temp_dir);
    assert_eq!(ids(&reopened, "VDWWD"), vec![1, 2, 3, 4]);

    let stats = reopened.stats().unwrap();
    assert_eq!(stats.total_documents, 4);
    assert_eq!(stats.metadata.map(|m| m.record_count), Some(4));
}
