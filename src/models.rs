//! Core data structures for the injection water pipeline.
//!
//! Defines the extract kinds, the suitability partition, ingestion
//! statistics and the immutable snapshot every report reads from.

use crate::constants::{FOCUS_COUNTY, OTHER_COUNTY_BUCKET};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extract kinds delivered per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    QuarterlyInjection,
    MonthlyInjection,
    WellRegistry,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::QuarterlyInjection,
        RecordKind::MonthlyInjection,
        RecordKind::WellRegistry,
    ];

    /// Directory directly under the data root
    pub fn directory(&self) -> &'static str {
        match self {
            RecordKind::QuarterlyInjection => "quarterly",
            RecordKind::MonthlyInjection => "monthly",
            RecordKind::WellRegistry => "wells",
        }
    }

    /// File stem inside each year directory
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::QuarterlyInjection => "QuarterlyInjection",
            RecordKind::MonthlyInjection => "MonthlyInjection",
            RecordKind::WellRegistry => "AllWells",
        }
    }

    /// `<data_dir>/<kind>/<year>/<table>.csv`
    pub fn extract_path(&self, data_dir: &Path, year: i32) -> PathBuf {
        data_dir
            .join(self.directory())
            .join(year.to_string())
            .join(format!("{}.csv", self.table()))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directory())
    }
}

/// Water quality and treatment partition. Every record lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suitability {
    /// Meets domestic or irrigation standards untreated
    Yes,
    /// Unsuitable, but at least one treatment method applied
    NoTreated,
    NoUntreated,
}

impl Suitability {
    pub const ALL: [Suitability; 3] = [
        Suitability::Yes,
        Suitability::NoTreated,
        Suitability::NoUntreated,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Suitability::Yes => "yes",
            Suitability::NoTreated => "no_treated",
            Suitability::NoUntreated => "no_untreated",
        }
    }
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// County grouping used by the county reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountyBucket {
    Focus,
    Other,
}

impl CountyBucket {
    pub fn label(&self) -> &'static str {
        match self {
            CountyBucket::Focus => FOCUS_COUNTY,
            CountyBucket::Other => OTHER_COUNTY_BUCKET,
        }
    }
}

/// Per-kind ingestion counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub files_read: usize,
    pub rows_read: usize,
    pub duplicates_dropped: usize,
}

impl IngestStats {
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.duplicates_dropped
    }
}

/// Counts reported after a full build, also written next to the snapshot
#[derive(Debug, Default, Serialize)]
pub struct BuildStats {
    pub quarterly: IngestStats,
    pub monthly: IngestStats,
    pub registry: IngestStats,
    pub locations: usize,
    pub quarterly_unmatched: usize,
    pub monthly_unmatched: usize,
    pub snapshot_dir: PathBuf,
    pub processing_time_ms: u128,
}

/// The three typed tables every report reads.
///
/// Built once by the pipeline, persisted as Parquet and passed by reference
/// to reporting functions; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub quarterly: DataFrame,
    pub monthly: DataFrame,
    pub wells: DataFrame,
}
