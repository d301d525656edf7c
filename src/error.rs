//! Error handling for the injection water pipeline.
//!
//! Only structural failures are errors here. Bad category codes, unmatched
//! joins and non-numeric volumes are data-quality facts and flow through the
//! tables as sentinel labels or nulls instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing {kind} extract for {year}: {path}")]
    MissingExtract {
        kind: String,
        year: i32,
        path: PathBuf,
    },

    #[error("Column '{column}' not found in {table} table")]
    MissingColumn { table: String, column: String },

    #[error("Join key ({keys}) is not unique in {table}: {count} keys repeat")]
    DuplicateJoinKey {
        table: String,
        keys: String,
        count: usize,
    },

    #[error("Snapshot not found at path: {path}")]
    SnapshotNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unknown report '{name}'")]
    UnknownReport { name: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
