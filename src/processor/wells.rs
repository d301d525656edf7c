//! Well location and registry joins.
//!
//! The registry carries one row per well per year. It is reduced to its
//! operator/county facts, deduplicated, keyed by the ten character API
//! prefix, enriched from the location reference and then left-joined onto
//! both injection tables by (api_number, year).
//!
//! A repeated join key on the right side would silently multiply injection
//! rows, so uniqueness is checked before every join and row counts are
//! checked after.

use crate::codes;
use crate::constants::columns::{
    API_NUMBER, API10, COUNTY_NAME, FIELD_NAME, LATITUDE, LONGITUDE, OPERATOR_CODE,
    OPERATOR_NAME, REGISTRY_PROVIDED, YEAR,
};
use crate::error::{PipelineError, Result};
use crate::schema::{require_columns, text_values};

use super::ingest::read_text_csv;

use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Fail if any combination of `keys` appears more than once
pub fn ensure_unique(df: &DataFrame, table: &str, keys: &[&str]) -> Result<()> {
    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(*k)).collect();
    let repeated = df
        .clone()
        .lazy()
        .group_by(key_exprs)
        .agg([len().alias("rows")])
        .filter(col("rows").gt(lit(1)))
        .collect()?;

    if repeated.height() > 0 {
        return Err(PipelineError::DuplicateJoinKey {
            table: table.to_string(),
            keys: keys.join(", "),
            count: repeated.height(),
        });
    }
    Ok(())
}

/// Add an all-null text column when the extract lacks it
fn ensure_text_column(df: &mut DataFrame, name: &str) -> Result<()> {
    if df.get_column_index(name).is_none() {
        warn!("Column '{}' absent from extract, filling with nulls", name);
        let height = df.height();
        df.with_column(Column::full_null(name.into(), height, &DataType::String))?;
    }
    Ok(())
}

/// Replace the API column with trimmed values so both join sides agree
pub fn normalize_api_column(mut df: DataFrame, name: &str) -> Result<DataFrame> {
    let trimmed: Vec<Option<String>> = text_values(&df, "api", name)?
        .into_iter()
        .map(|v| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .collect();
    df.with_column(Column::new(name.into(), trimmed))?;
    Ok(df)
}

/// Load the cached location reference.
///
/// Only the key, coordinates and field name are kept; rows without a key
/// cannot join and are dropped.
pub fn load_locations(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(PipelineError::Configuration {
            message: format!("well location cache not found: {}", path.display()),
        });
    }

    let mut df = read_text_csv(path)?;
    require_columns(&df, "well locations", &[API10, LATITUDE, LONGITUDE])?;
    ensure_text_column(&mut df, FIELD_NAME)?;

    let keys: Vec<Option<String>> = text_values(&df, "well locations", API10)?
        .iter()
        .map(|v| codes::api10(v.as_deref()))
        .collect();
    df.with_column(Column::new(API10.into(), keys))?;

    let df = df
        .select([API10, LATITUDE, LONGITUDE, FIELD_NAME])?
        .lazy()
        .filter(col(API10).is_not_null())
        .collect()?
        .unique_stable(None, UniqueKeepStrategy::First, None)?;

    ensure_unique(&df, "well locations", &[API10])?;
    info!("Loaded {} well locations from {}", df.height(), path.display());
    Ok(df)
}

/// Reduce the registry to one row per (api_number, year) and attach
/// locations by API prefix
pub fn enrich_registry(registry: DataFrame, locations: &DataFrame) -> Result<DataFrame> {
    let mut registry = normalize_api_column(registry, API_NUMBER)?;
    for name in [OPERATOR_CODE, OPERATOR_NAME, COUNTY_NAME] {
        ensure_text_column(&mut registry, name)?;
    }

    let before = registry.height();
    let mut reduced = registry
        .select([API_NUMBER, OPERATOR_CODE, OPERATOR_NAME, COUNTY_NAME, YEAR])?
        .lazy()
        .filter(col(API_NUMBER).is_not_null())
        .collect()?
        .unique_stable(None, UniqueKeepStrategy::First, None)?;
    debug!(
        "Registry reduced from {} to {} rows",
        before,
        reduced.height()
    );

    let short_keys: Vec<Option<String>> = text_values(&reduced, "well registry", API_NUMBER)?
        .iter()
        .map(|v| codes::api10(v.as_deref()))
        .collect();
    reduced.with_column(Column::new(API10.into(), short_keys))?;

    ensure_unique(&reduced, "well registry", &[API_NUMBER, YEAR])?;

    let enriched = reduced
        .lazy()
        .join(
            locations.clone().lazy(),
            [col(API10)],
            [col(API10)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    let located = enriched.height() - enriched.column(LATITUDE)?.null_count();
    info!(
        "Registry has {} well-years, {} with a location match",
        enriched.height(),
        located
    );
    Ok(enriched)
}

/// Left-join the enriched registry onto an injection table.
///
/// Returns the joined table and the number of rows no registry entry
/// matched. Unmatched rows keep null operator, county and location fields.
pub fn attach_registry(
    injection: DataFrame,
    registry: &DataFrame,
    table: &str,
) -> Result<(DataFrame, usize)> {
    let mut injection = normalize_api_column(injection, API_NUMBER)?;
    for name in REGISTRY_PROVIDED {
        if injection.get_column_index(name).is_some() {
            debug!("Dropping {} column '{}' in favour of registry", table, name);
            injection = injection.drop(name)?;
        }
    }

    let rows = injection.height();
    let joined = injection
        .lazy()
        .join(
            registry.clone().lazy(),
            [col(API_NUMBER), col(YEAR)],
            [col(API_NUMBER), col(YEAR)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    if joined.height() != rows {
        return Err(PipelineError::DuplicateJoinKey {
            table: table.to_string(),
            keys: format!("{}, {}", API_NUMBER, YEAR),
            count: joined.height() - rows,
        });
    }

    let unmatched = joined.column(API10)?.null_count();
    if unmatched > 0 {
        warn!(
            "{} of {} {} rows have no registry entry for their well-year",
            unmatched, rows, table
        );
    }
    Ok((joined, unmatched))
}
