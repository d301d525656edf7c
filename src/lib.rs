//! Injection Water Library
//!
//! Reproducible analysis of the water injected into California oil and gas
//! wells, built from the state's quarterly and monthly injection reports and
//! its annual well registry for 2018 to 2021.
//!
//! This library provides tools for:
//! - Ingesting the per-year CSV extracts as text, deduplicated and year-tagged
//! - Joining registry and well location metadata onto injection records
//! - Normalizing water source, water kind and suitability codes
//! - Persisting the typed tables as a Parquet snapshot
//! - Grouped gallon summaries with percentages and wide pivots
//! - Comparing flagged quarterly records against the monthly report

pub mod codes;
pub mod config;
pub mod constants;
pub mod crosscheck;
pub mod error;
pub mod models;
pub mod processor;
pub mod report;
pub mod schema;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::PipelineConfig;
pub use crosscheck::{Discrepancy, FlagRule, crosscheck};
pub use error::{PipelineError, Result};
pub use models::{RecordKind, Snapshot, Suitability};
pub use processor::Pipeline;
pub use report::{Dimension, Filter, Query, ReportTable, catalog, find_query, run_query};
