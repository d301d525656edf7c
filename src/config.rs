//! Configuration management and validation.
//!
//! Only locations are configurable. The analysis window, the barrel to gallon
//! multiplier and the extract naming convention are fixed in
//! [`crate::constants`].

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_LOCATION_CACHE, DEFAULT_SNAPSHOT_DIR, YEARS};
use crate::error::{PipelineError, Result};
use crate::models::RecordKind;
use std::path::PathBuf;
use tracing::debug;

/// Paths used by a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Root holding `<kind>/<year>/<table>.csv`
    pub data_dir: PathBuf,

    /// Cached well location reference
    pub location_cache: PathBuf,

    /// Directory the typed snapshot is written to and loaded from
    pub snapshot_dir: PathBuf,

    /// Write every rendered table as CSV here when set
    pub export_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            location_cache: PathBuf::from(DEFAULT_LOCATION_CACHE),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            export_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Use a different extract root. The location cache follows it unless it
    /// was set explicitly.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        if self.location_cache == PathBuf::from(DEFAULT_LOCATION_CACHE) {
            self.location_cache = data_dir.join("well_locations.csv");
        }
        self.data_dir = data_dir;
        self
    }

    pub fn with_location_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.location_cache = path.into();
        self
    }

    pub fn with_snapshot_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = path.into();
        self
    }

    pub fn with_export_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(path.into());
        self
    }

    /// Every extract path a build reads, in kind then year order
    pub fn extract_paths(&self) -> Vec<(RecordKind, i32, PathBuf)> {
        RecordKind::ALL
            .iter()
            .flat_map(|kind| {
                YEARS
                    .iter()
                    .map(move |year| (*kind, *year, kind.extract_path(&self.data_dir, *year)))
            })
            .collect()
    }

    /// Check that the inputs of a build exist
    pub fn validate_for_build(&self) -> Result<()> {
        if !self.data_dir.is_dir() {
            return Err(PipelineError::Configuration {
                message: format!("data directory not found: {}", self.data_dir.display()),
            });
        }
        if !self.location_cache.is_file() {
            return Err(PipelineError::Configuration {
                message: format!(
                    "well location cache not found: {} (fetch the location layer once and save it as CSV)",
                    self.location_cache.display()
                ),
            });
        }
        debug!(
            "Build configuration validated, expecting {} extracts under {}",
            self.extract_paths().len(),
            self.data_dir.display()
        );
        Ok(())
    }
}
