//! Migrations apply once and survive reopening the file.

use vantage_core::models::*;
use vantage_core::traits::IExperimentStorage;
use vantage_storage::migrations::LATEST_VERSION;
use vantage_storage::pool::pragmas::verify_wal_mode;
use vantage_storage::StorageEngine;

#[test]
fn fresh_database_is_at_latest_version() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert_eq!(engine.schema_version().unwrap(), LATEST_VERSION);
}

#[test]
fn reopen_keeps_data_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vantage.db");

    {
        let engine = StorageEngine::open(&db_path).unwrap();
        let exp = Experiment::from_new(
            "exp-1".into(),
            NewExperiment::new("Persisted", UrlTarget::regex(r"^/quote/(auto|home)$")),
            ConfidenceLevel::Ninety,
        );
        engine
            .create_experiment(&exp, &ExperimentEvent::new("exp-1", EventKind::Created))
            .unwrap();
    }

    let engine = StorageEngine::open(&db_path).unwrap();
    assert_eq!(engine.schema_version().unwrap(), LATEST_VERSION);
    let loaded = engine.get_experiment("exp-1").unwrap().unwrap();
    assert_eq!(loaded.target.match_type, MatchType::Regex);
    assert_eq!(loaded.confidence_level, ConfidenceLevel::Ninety);
}

#[test]
fn file_backed_writer_uses_wal() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StorageEngine::open(&dir.path().join("wal.db")).unwrap();
    let wal = engine
        .pool()
        .writer
        .with_conn_sync(verify_wal_mode)
        .unwrap();
    assert!(wal);
    assert_eq!(engine.pool().reader_count(), 4);
}

#[test]
fn in_memory_engine_reads_through_writer() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert!(engine.pool().readers.is_none());
    assert_eq!(engine.pool().reader_count(), 0);

    let exp = Experiment::from_new(
        "exp-mem".into(),
        NewExperiment::new("Memory", UrlTarget::exact("/pricing")),
        ConfidenceLevel::NinetyFive,
    );
    engine
        .create_experiment(&exp, &ExperimentEvent::new("exp-mem", EventKind::Created))
        .unwrap();
    assert!(engine.get_experiment("exp-mem").unwrap().is_some());
}

#[test]
fn reader_pool_size_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clamp.db");
    let big = StorageEngine::open_with_pool_size(&path, 64).unwrap();
    assert_eq!(
        big.pool().reader_count(),
        vantage_core::config::defaults::MAX_READ_POOL_SIZE
    );
    drop(big);
    let zero = StorageEngine::open_with_pool_size(&path, 0).unwrap();
    assert_eq!(zero.pool().reader_count(), 1);
}
