//! Extract ingestion.
//!
//! Reads each per-year CSV with every column as text, renames headers to the
//! canonical vocabulary, tags rows with their year, drops exact duplicate
//! rows and stacks the years of each kind into one table.

use crate::config::PipelineConfig;
use crate::constants::YEARS;
use crate::constants::columns::{API_NUMBER, INJECTION_DATE, REPORT_DATE, VOLUME_BBL, YEAR};
use crate::error::{PipelineError, Result};
use crate::models::{IngestStats, RecordKind};
use crate::schema::{normalize_columns, require_columns};

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Year-spanning raw tables, all columns text apart from `year`
#[derive(Debug, Clone)]
pub struct RawTables {
    pub quarterly: DataFrame,
    pub monthly: DataFrame,
    pub registry: DataFrame,
}

/// Columns a kind cannot be analysed without
pub fn required_columns(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::QuarterlyInjection => &[API_NUMBER, REPORT_DATE, VOLUME_BBL],
        RecordKind::MonthlyInjection => &[API_NUMBER, INJECTION_DATE, VOLUME_BBL],
        RecordKind::WellRegistry => &[API_NUMBER],
    }
}

/// Read a CSV with type inference disabled so every column stays text
pub fn read_text_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    normalize_columns(df)
}

/// Load one year of one kind. A missing file aborts the run.
pub fn ingest_year(kind: RecordKind, year: i32, path: &Path) -> Result<(DataFrame, IngestStats)> {
    if !path.is_file() {
        return Err(PipelineError::MissingExtract {
            kind: kind.to_string(),
            year,
            path: path.to_path_buf(),
        });
    }

    let raw = read_text_csv(path)?;
    let rows_read = raw.height();
    let mut df = raw.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let duplicates_dropped = rows_read - df.height();
    let height = df.height();
    df.with_column(Column::new(YEAR.into(), vec![year; height]))?;

    debug!(
        "Read {} {} rows from {} ({} exact duplicates dropped)",
        rows_read,
        kind,
        path.display(),
        duplicates_dropped
    );

    Ok((
        df,
        IngestStats {
            files_read: 1,
            rows_read,
            duplicates_dropped,
        },
    ))
}

/// Load every year of one kind and stack them.
///
/// Years are concatenated diagonally: a column that only some years carry is
/// null in the others.
pub fn ingest_kind(
    config: &PipelineConfig,
    kind: RecordKind,
    progress: &ProgressBar,
) -> Result<(DataFrame, IngestStats)> {
    let mut frames = Vec::with_capacity(YEARS.len());
    let mut stats = IngestStats::default();

    for year in YEARS {
        let path = kind.extract_path(&config.data_dir, *year);
        progress.set_message(format!("{} {}", kind, year));

        let (df, year_stats) = ingest_year(kind, *year, &path)?;
        stats.files_read += year_stats.files_read;
        stats.rows_read += year_stats.rows_read;
        stats.duplicates_dropped += year_stats.duplicates_dropped;
        frames.push(df.lazy());

        progress.inc(1);
    }

    let table = concat_lf_diagonal(frames, UnionArgs::default())?.collect()?;
    require_columns(&table, &kind.to_string(), required_columns(kind))?;

    info!(
        "Ingested {} {} rows across {} files ({} duplicates dropped)",
        table.height(),
        kind,
        stats.files_read,
        stats.duplicates_dropped
    );

    Ok((table, stats))
}

/// Load all three kinds for the whole analysis window
pub fn ingest_all(
    config: &PipelineConfig,
    show_progress: bool,
) -> Result<(RawTables, [IngestStats; 3])> {
    let total_files = (RecordKind::ALL.len() * YEARS.len()) as u64;
    let progress = if show_progress {
        let pb = ProgressBar::new(total_files);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let (quarterly, quarterly_stats) =
        ingest_kind(config, RecordKind::QuarterlyInjection, &progress)?;
    let (monthly, monthly_stats) = ingest_kind(config, RecordKind::MonthlyInjection, &progress)?;
    let (registry, registry_stats) = ingest_kind(config, RecordKind::WellRegistry, &progress)?;

    progress.finish_with_message("All extracts read");

    Ok((
        RawTables {
            quarterly,
            monthly,
            registry,
        },
        [quarterly_stats, monthly_stats, registry_stats],
    ))
}
