//! Column naming and typed column access.
//!
//! Extract headers drift between years (`APINumber`, `API`, `Water Injected
//! (BBL)` ...). Every table is renamed to one snake_case vocabulary on read,
//! and the rest of the crate reads columns through the accessors here so a
//! missing column surfaces as [`PipelineError::MissingColumn`].

use crate::constants::COLUMN_ALIASES;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid regex"));
static CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Convert a raw header to snake_case without applying aliases
pub fn snake_case(raw: &str) -> String {
    let split = ACRONYM_BOUNDARY.replace_all(raw.trim(), "${1}_${2}");
    let split = CASE_BOUNDARY.replace_all(&split, "${1}_${2}");
    let lower = split.to_lowercase();
    NON_ALNUM
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// Convert a raw header to its canonical column name
pub fn canonical_column_name(raw: &str) -> String {
    let snake = snake_case(raw);
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == snake)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(snake)
}

/// Rename every column of `df` to its canonical name.
///
/// Two headers that collapse to the same name keep the first; later ones get
/// a numeric suffix so no data is silently discarded.
pub fn normalize_columns(df: DataFrame) -> Result<DataFrame> {
    let mut seen = HashSet::new();
    let mut renamed = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let base = canonical_column_name(column.name().as_str());
        let mut name = base.clone();
        let mut n = 2;
        while !seen.insert(name.clone()) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        if name != column.name().as_str() {
            debug!("Renamed column '{}' -> '{}'", column.name(), name);
        }
        renamed.push(column.clone().with_name(name.into()));
    }

    Ok(DataFrame::new(renamed)?)
}

/// Fail unless every listed column is present
pub fn require_columns(df: &DataFrame, table: &str, names: &[&str]) -> Result<()> {
    for name in names {
        if df.get_column_index(name).is_none() {
            return Err(PipelineError::MissingColumn {
                table: table.to_string(),
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

fn series<'a>(df: &'a DataFrame, table: &str, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| PipelineError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
}

/// Read a column as text, casting non-string columns
pub fn text_values(df: &DataFrame, table: &str, name: &str) -> Result<Vec<Option<String>>> {
    let as_text = series(df, table, name)?.cast(&DataType::String)?;
    Ok(as_text
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

/// Read a column as text, or all nulls when the extract never carried it
pub fn optional_text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    if df.get_column_index(name).is_none() {
        return Ok(vec![None; df.height()]);
    }
    text_values(df, "optional", name)
}

pub fn int_values(df: &DataFrame, table: &str, name: &str) -> Result<Vec<Option<i32>>> {
    let cast = series(df, table, name)?.cast(&DataType::Int32)?;
    Ok(cast.i32()?.into_iter().collect())
}

pub fn float_values(df: &DataFrame, table: &str, name: &str) -> Result<Vec<Option<f64>>> {
    let cast = series(df, table, name)?.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

#[cfg(test)]
pub fn bool_values(df: &DataFrame, table: &str, name: &str) -> Result<Vec<Option<bool>>> {
    let cast = series(df, table, name)?.cast(&DataType::Boolean)?;
    Ok(cast.bool()?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_splits_acronyms_and_camel_case() {
        assert_eq!(snake_case("APINumber"), "api_number");
        assert_eq!(snake_case("WaterSourceType"), "water_source_type");
        assert_eq!(snake_case("Water Injected (BBL)"), "water_injected_bbl");
        assert_eq!(snake_case("  county_name "), "county_name");
    }

    #[test]
    fn test_canonical_names_apply_aliases() {
        assert_eq!(canonical_column_name("API"), "api_number");
        assert_eq!(canonical_column_name("APINumber"), "api_number");
        assert_eq!(canonical_column_name("Water Injected (BBL)"), "volume_bbl");
        assert_eq!(canonical_column_name("County"), "county_name");
        assert_eq!(canonical_column_name("PressurePeak"), "pressure_peak");
    }

    #[test]
    fn test_normalize_columns_suffixes_collisions() {
        let df = df!(
            "API" => &["0403012345"],
            "APINumber" => &["0403012345"],
            "Operator" => &["Acme Oil"],
        )
        .unwrap();

        let df = normalize_columns(df).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        assert_eq!(names, vec!["api_number", "api_number_2", "operator_name"]);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let df = df!("api_number" => &["1"]).unwrap();
        let err = require_columns(&df, "quarterly", &["api_number", "volume_bbl"]).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { ref column, .. } if column == "volume_bbl"));
    }

    #[test]
    fn test_optional_text_values_fill_nulls() {
        let df = df!("api_number" => &["1", "2"]).unwrap();
        let values = optional_text_values(&df, "water_source_name").unwrap();
        assert_eq!(values, vec![None, None]);
    }
}
