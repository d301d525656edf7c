//! Snapshot persistence.
//!
//! The typed tables are written once per build as Parquet and loaded by every
//! reporting command. A snapshot is all three files or nothing. The build
//! counts sit beside them as JSON and are not needed to load.

use crate::constants::{
    BUILD_STATS_FILE, SNAPSHOT_MONTHLY_FILE, SNAPSHOT_QUARTERLY_FILE, SNAPSHOT_WELLS_FILE,
};
use crate::error::{PipelineError, Result};
use crate::models::{BuildStats, Snapshot};

use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn table_paths(dir: &Path) -> [PathBuf; 3] {
    [
        dir.join(SNAPSHOT_QUARTERLY_FILE),
        dir.join(SNAPSHOT_MONTHLY_FILE),
        dir.join(SNAPSHOT_WELLS_FILE),
    ]
}

fn write_table(path: &Path, df: &DataFrame) -> Result<()> {
    let mut df = df.clone();
    let file = File::create(path)?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut df)?;
    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

fn read_table(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}

/// Write `stats` as pretty JSON into the snapshot directory
pub fn write_build_stats(dir: &Path, stats: &BuildStats) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(BUILD_STATS_FILE);
    let file = File::create(&path)?;
    serde_json::to_writer_pretty(file, stats)?;
    debug!("Wrote build stats to {}", path.display());
    Ok(path)
}

impl Snapshot {
    /// Write all three tables into `dir`, creating it if needed
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        let [quarterly, monthly, wells] = table_paths(dir);
        write_table(&quarterly, &self.quarterly)?;
        write_table(&monthly, &self.monthly)?;
        write_table(&wells, &self.wells)?;
        info!("Snapshot saved to {}", dir.display());
        Ok(())
    }

    /// Load a snapshot previously written by [`Snapshot::save`]
    pub fn load(dir: &Path) -> Result<Self> {
        let paths = table_paths(dir);
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            return Err(PipelineError::SnapshotNotFound {
                path: missing.clone(),
            });
        }
        let [quarterly, monthly, wells] = paths;
        let snapshot = Self {
            quarterly: read_table(&quarterly)?,
            monthly: read_table(&monthly)?,
            wells: read_table(&wells)?,
        };
        info!(
            "Loaded snapshot: {} quarterly, {} monthly, {} well-year rows",
            snapshot.quarterly.height(),
            snapshot.monthly.height(),
            snapshot.wells.height()
        );
        Ok(snapshot)
    }
}
