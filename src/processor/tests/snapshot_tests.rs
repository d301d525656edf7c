//! Snapshot persistence

use super::*;
use crate::constants::{BUILD_STATS_FILE, SNAPSHOT_WELLS_FILE};
use crate::error::PipelineError;
use crate::models::Snapshot;
use crate::processor::Pipeline;

#[test]
fn test_run_writes_a_loadable_snapshot() {
    let (_temp_dir, config) = dataset();
    let snapshot_dir = config.snapshot_dir.clone();

    let pipeline = Pipeline::new(config);
    let (built, _stats) = pipeline.build_snapshot().unwrap();
    pipeline.run().unwrap();

    let loaded = Snapshot::load(&snapshot_dir).unwrap();
    assert!(loaded.quarterly.equals_missing(&built.quarterly));
    assert!(loaded.monthly.equals_missing(&built.monthly));
    assert!(loaded.wells.equals_missing(&built.wells));
}

#[test]
fn test_incomplete_snapshot_is_not_loaded() {
    let (_temp_dir, config) = dataset();
    let pipeline = Pipeline::new(config.clone());
    pipeline.run().unwrap();

    fs::remove_file(config.snapshot_dir.join(SNAPSHOT_WELLS_FILE)).unwrap();
    match Snapshot::load(&config.snapshot_dir).unwrap_err() {
        PipelineError::SnapshotNotFound { path } => {
            assert!(path.ends_with(SNAPSHOT_WELLS_FILE));
        }
        other => panic!("Expected SnapshotNotFound, got {:?}", other),
    }
}

#[test]
fn test_run_records_build_stats_beside_snapshot() {
    let (_temp_dir, config) = dataset();
    let stats = Pipeline::new(config.clone()).run().unwrap();

    let path = config.snapshot_dir.join(BUILD_STATS_FILE);
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["quarterly"]["rows_read"], 10);
    assert_eq!(json["quarterly"]["duplicates_dropped"], 1);
    assert_eq!(json["locations"], stats.locations);

    // the JSON file is not part of the snapshot proper
    fs::remove_file(config.snapshot_dir.join(BUILD_STATS_FILE)).unwrap();
    assert!(Snapshot::load(&config.snapshot_dir).is_ok());
}
